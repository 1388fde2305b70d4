//! End-to-end passes through the `Raytracer` facade.

use std::sync::Arc;

use lumen_core::{find_lights, Face, Material, Model, RenderOptions, RenderSettings, Schedule};
use lumen_math::Vec3;
use lumen_renderer::{PassOutcome, Raytracer};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A grey wall behind a small emissive quad.
fn scene() -> Vec<Model> {
    let wall = Model::new(
        "wall",
        vec![
            Vec3::new(-4.0, -3.0, 2.0),
            Vec3::new(-3.0, 4.0, 2.0),
            Vec3::new(4.0, 3.0, 2.0),
            Vec3::new(3.0, -4.0, 2.0),
        ],
        vec![Face::new(vec![0, 1, 2, 3])],
    )
    .with_material(Arc::new(Material::default()));

    let lamp = Model::new(
        "lamp",
        vec![
            Vec3::new(-0.2, 1.0, 0.5),
            Vec3::new(0.2, 1.0, 0.5),
            Vec3::new(0.2, 1.0, 0.9),
            Vec3::new(-0.2, 1.0, 0.9),
        ],
        vec![Face::new(vec![0, 1, 2]), Face::new(vec![0, 2, 3])],
    )
    .with_material(Arc::new(Material::emitter("lamp", Vec3::ONE)));

    vec![wall, lamp]
}

fn settings(options: RenderOptions, models: &[Model]) -> RenderSettings {
    RenderSettings::new(
        RenderOptions {
            model_translation: [0.0; 3],
            ..options
        },
        find_lights(models),
    )
}

#[test]
fn test_pass_completes_and_fills_buffer() {
    init_logging();
    let models = scene();
    let mut raytracer = Raytracer::new(32, 24);
    raytracer
        .render(&models, &settings(RenderOptions::default(), &models))
        .unwrap();

    assert_eq!(raytracer.wait().unwrap(), Some(PassOutcome::Completed));
    assert!(!raytracer.is_running());
    assert_eq!(raytracer.progress(), 24);
    assert_eq!(raytracer.scene().len(), 4);

    // Just off center the wall is visible and lit
    let frame = raytracer.frame_buffer();
    let pixel = frame.get(18, 13);
    assert!(pixel[0] > 0);
    assert_eq!(pixel[3], 255);
}

#[test]
fn test_restart_discards_previous_pass() {
    init_logging();
    let models = scene();
    let mut raytracer = Raytracer::new(64, 64);
    let options = RenderOptions {
        shadows: true,
        monte_carlo: true,
        light_samples: 32,
        ..Default::default()
    };

    raytracer.render(&models, &settings(options.clone(), &models)).unwrap();
    raytracer.render(&models[..1], &settings(options, &models[..1])).unwrap();
    assert_eq!(raytracer.wait().unwrap(), Some(PassOutcome::Completed));

    // Only the wall remains, and with no lights it renders black
    assert_eq!(raytracer.scene().len(), 2);
    let frame = raytracer.frame_buffer();
    assert!(frame.to_rgba().chunks(4).all(|p| p == [0, 0, 0, 255]));
}

#[test]
fn test_stop_cancels_or_reports_completion() {
    init_logging();
    let models = scene();
    let mut raytracer = Raytracer::new(256, 256);
    let options = RenderOptions {
        shadows: true,
        monte_carlo: true,
        light_samples: 64,
        ..Default::default()
    };
    raytracer.render(&models, &settings(options, &models)).unwrap();

    match raytracer.stop().unwrap() {
        Some(PassOutcome::Cancelled { units }) => {
            assert!(units <= 256);
            let frame = raytracer.frame_buffer();
            for y in units..256 {
                for x in 0..256 {
                    assert_eq!(frame.get(x, y), [0, 0, 0, 255], "pixel ({}, {})", x, y);
                }
            }
        }
        Some(PassOutcome::Completed) => {}
        None => panic!("a pass was running"),
    }
    assert!(!raytracer.is_running());
    assert_eq!(raytracer.stop().unwrap(), None);
}

#[test]
fn test_bucket_schedule_matches_rows() {
    init_logging();
    let models = scene();
    let rows_options = RenderOptions {
        shadows: true,
        reflection: true,
        ..Default::default()
    };
    let bucket_options = RenderOptions {
        schedule: Schedule::Buckets,
        bucket_size: 7,
        ..rows_options.clone()
    };

    let mut rows = Raytracer::new(40, 30);
    rows.render(&models, &settings(rows_options, &models)).unwrap();
    rows.wait().unwrap();

    let mut buckets = Raytracer::new(40, 30);
    buckets.render(&models, &settings(bucket_options, &models)).unwrap();
    assert_eq!(buckets.wait().unwrap(), Some(PassOutcome::Completed));

    assert_eq!(rows.frame_buffer().to_rgba(), buckets.frame_buffer().to_rgba());
}
