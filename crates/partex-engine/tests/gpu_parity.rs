//! GPU kernel vs CPU reference. Needs an adapter, so it is ignored by default:
//! `cargo test -p partex-engine --test gpu_parity -- --ignored`.

use image::RgbaImage;

use partex_engine::coords::texel_center;
use partex_engine::device::{Gpu, GpuInit};
use partex_engine::generate::{GenerationRequest, Generator};
use partex_engine::material::BlendMode;
use partex_engine::paint::{
    bake, Color, ColorStop, Gradient, GradientLookup, GradientMode, LOOKUP_HEIGHT, LOOKUP_WIDTH,
};
use partex_engine::raster::{CpuRasterizer, TextureResolution};
use partex_engine::render::GpuRasterizer;
use partex_engine::shape::Shape;

/// Per-channel slack for coverage rounding between the two float paths.
const TOLERANCE: u8 = 2;

fn gradient() -> Gradient {
    Gradient::new(
        vec![
            ColorStop::new(0.0, Color::WHITE),
            ColorStop::new(0.4, Color::from_rgba8(255, 160, 40, 255)),
            ColorStop::new(1.0, Color::new(0.6, 0.0, 0.0, 0.0)),
        ],
        GradientMode::Blend,
    )
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(p, q)| p.abs_diff(*q) <= TOLERANCE)
}

/// Texels where `gpu` matches neither the CPU column nor its neighbours.
///
/// `atan2`/`fmod` on the GPU can land a texel right at a column boundary on
/// the other side, so a neighbouring lookup column counts as a match.
fn mismatches(shape: Shape, lookup: &GradientLookup, gpu: &RgbaImage) -> Vec<(u32, u32)> {
    let res = gpu.width();
    let last = lookup.width() - 1;

    gpu.enumerate_pixels()
        .filter(|&(x, y, pixel)| {
            let sample = shape.sample(texel_center(x, y, res), res);
            let column = lookup.column(sample.gradient);
            let lo = column.saturating_sub(1);
            let hi = (column + 1).min(last);

            !(lo..=hi).any(|c| {
                let [r, g, b, a] = lookup.image().get_pixel(c, 0).0;
                let expected = Color::from_rgba8(r, g, b, a)
                    .scaled(sample.coverage)
                    .to_rgba8();
                close(pixel.0, expected)
            })
        })
        .map(|(x, y, _)| (x, y))
        .collect()
}

#[test]
#[ignore = "requires a GPU adapter"]
fn gpu_matches_cpu_reference() {
    let gpu = match Gpu::new_blocking(GpuInit::default()) {
        Ok(gpu) => gpu,
        Err(e) => {
            eprintln!("skipping: {e:#}");
            return;
        }
    };

    let mut gpu = Generator::new(GpuRasterizer::new(gpu));
    let mut cpu = Generator::new(CpuRasterizer::new());
    eprintln!("adapter: {}", gpu.rasterizer().gpu().adapter_info().name);

    let lookup = bake(&gradient(), LOOKUP_WIDTH, LOOKUP_HEIGHT);

    for res in TextureResolution::ALL {
        for shape in Shape::ALL {
            let req = GenerationRequest {
                shape,
                resolution: res,
                gradient: gradient(),
                blend_mode: BlendMode::Additive,
            };
            let a = gpu.generate(&req).unwrap();
            let b = cpu.generate(&req).unwrap();
            assert_eq!(a.dimensions(), b.dimensions());

            let bad = mismatches(shape, &lookup, &a);
            assert!(
                bad.is_empty(),
                "{shape} at {res}: {} texels off by more than one lookup column, first {:?}",
                bad.len(),
                bad.first()
            );
        }
    }
}

#[test]
fn cpu_output_matches_itself_under_the_column_rule() {
    let lookup = bake(&gradient(), LOOKUP_WIDTH, LOOKUP_HEIGHT);
    let mut cpu = Generator::new(CpuRasterizer::new());

    for shape in Shape::ALL {
        let req = GenerationRequest {
            shape,
            resolution: TextureResolution::R64,
            gradient: gradient(),
            blend_mode: BlendMode::Additive,
        };
        let image = cpu.generate(&req).unwrap();
        assert!(mismatches(shape, &lookup, &image).is_empty(), "{shape}");
    }
}

#[test]
fn column_rule_rejects_a_wrong_texel() {
    let lookup = bake(&gradient(), LOOKUP_WIDTH, LOOKUP_HEIGHT);
    let mut image = Generator::new(CpuRasterizer::new())
        .generate(&GenerationRequest {
            shape: Shape::Circle,
            resolution: TextureResolution::R32,
            gradient: gradient(),
            blend_mode: BlendMode::Additive,
        })
        .unwrap();

    image.put_pixel(16, 16, image::Rgba([0, 0, 255, 255]));
    assert_eq!(mismatches(Shape::Circle, &lookup, &image), [(16, 16)]);
}
