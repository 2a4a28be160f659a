//! Applying generated textures to particle renderers.
//!
//! A [`ParticleRenderer`] stands in for the consuming renderer: it has one
//! material slot. Applying a texture always builds a fresh [`Material`] from
//! the blend mode's shader preset; materials are never reused.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Particle compositing preset.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    Additive,
    #[default]
    AlphaBlended,
    Multiply,
    VertexlitBlended,
}

/// Built-in particle shader a blend mode resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderPreset {
    /// Engine lookup name of the shader.
    pub name: &'static str,
    /// Color target blend state the shader renders with.
    pub blend: wgpu::BlendState,
}

static ADDITIVE: ShaderPreset = ShaderPreset {
    name: "Mobile/Particles/Additive",
    blend: wgpu::BlendState {
        color: blend_component(wgpu::BlendFactor::SrcAlpha, wgpu::BlendFactor::One),
        alpha: blend_component(wgpu::BlendFactor::Zero, wgpu::BlendFactor::One),
    },
};

static ALPHA_BLENDED: ShaderPreset = ShaderPreset {
    name: "Mobile/Particles/Alpha Blended",
    blend: wgpu::BlendState {
        color: blend_component(wgpu::BlendFactor::SrcAlpha, wgpu::BlendFactor::OneMinusSrcAlpha),
        alpha: blend_component(wgpu::BlendFactor::One, wgpu::BlendFactor::OneMinusSrcAlpha),
    },
};

static MULTIPLY: ShaderPreset = ShaderPreset {
    name: "Mobile/Particles/Multiply",
    blend: wgpu::BlendState {
        color: blend_component(wgpu::BlendFactor::Zero, wgpu::BlendFactor::Src),
        alpha: blend_component(wgpu::BlendFactor::Zero, wgpu::BlendFactor::One),
    },
};

static VERTEXLIT_BLENDED: ShaderPreset = ShaderPreset {
    name: "Mobile/Particles/VertexLit Blended",
    blend: wgpu::BlendState {
        color: blend_component(wgpu::BlendFactor::SrcAlpha, wgpu::BlendFactor::OneMinusSrcAlpha),
        alpha: blend_component(wgpu::BlendFactor::One, wgpu::BlendFactor::OneMinusSrcAlpha),
    },
};

const fn blend_component(src: wgpu::BlendFactor, dst: wgpu::BlendFactor) -> wgpu::BlendComponent {
    wgpu::BlendComponent {
        src_factor: src,
        dst_factor: dst,
        operation: wgpu::BlendOperation::Add,
    }
}

impl BlendMode {
    pub const ALL: [BlendMode; 4] = [
        BlendMode::Additive,
        BlendMode::AlphaBlended,
        BlendMode::Multiply,
        BlendMode::VertexlitBlended,
    ];

    /// Shader preset for this mode.
    pub fn preset(self) -> &'static ShaderPreset {
        match self {
            BlendMode::Additive => &ADDITIVE,
            BlendMode::AlphaBlended => &ALPHA_BLENDED,
            BlendMode::Multiply => &MULTIPLY,
            BlendMode::VertexlitBlended => &VERTEXLIT_BLENDED,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BlendMode::Additive => "additive",
            BlendMode::AlphaBlended => "alpha_blended",
            BlendMode::Multiply => "multiply",
            BlendMode::VertexlitBlended => "vertexlit_blended",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a blend mode name does not match any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown blend mode `{0}`")]
pub struct UnknownBlendMode(pub String);

impl FromStr for BlendMode {
    type Err = UnknownBlendMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        BlendMode::ALL
            .into_iter()
            .find(|m| m.name() == norm)
            .ok_or_else(|| UnknownBlendMode(s.to_string()))
    }
}

/// A material instance: shader preset plus its main texture.
#[derive(Debug, Clone)]
pub struct Material {
    pub shader: &'static ShaderPreset,
    pub main_texture: Option<Arc<RgbaImage>>,
}

impl Material {
    pub fn new(shader: &'static ShaderPreset) -> Self {
        Self {
            shader,
            main_texture: None,
        }
    }
}

/// A particle renderer with a single shared material slot.
#[derive(Debug, Clone, Default)]
pub struct ParticleRenderer {
    pub name: String,
    pub shared_material: Option<Material>,
}

impl ParticleRenderer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shared_material: None,
        }
    }
}

/// Outcome of [`apply`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ApplyOutcome {
    Applied,
    /// No renderer was assigned; nothing changed.
    NoTarget,
}

/// Assigns `texture` to `target` through a new material for `blend`.
///
/// A missing target is not an error: it logs a warning and returns
/// [`ApplyOutcome::NoTarget`].
pub fn apply(
    texture: Arc<RgbaImage>,
    target: Option<&mut ParticleRenderer>,
    blend: BlendMode,
) -> ApplyOutcome {
    let Some(renderer) = target else {
        log::warn!("no particle renderer assigned; texture not applied");
        return ApplyOutcome::NoTarget;
    };

    let shader = blend.preset();
    log::info!(
        "applied {}x{} texture to `{}` with shader \"{}\"",
        texture.width(),
        texture.height(),
        renderer.name,
        shader.name,
    );

    let mut material = Material::new(shader);
    material.main_texture = Some(texture);
    renderer.shared_material = Some(material);
    ApplyOutcome::Applied
}
