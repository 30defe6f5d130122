use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;
use worldkit_ecs::{AudioSource, Camera, Light, Material};
use worldkit_kernel::World;
use worldkit_tools::WorldInspector;

#[derive(Parser)]
#[command(name = "worldkit-cli", about = "CLI for worldkit scene operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version info
    Info,
    /// Build a demo scene and tick it
    Demo {
        /// Number of ticks to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Number of prop entities to spawn
        #[arg(short, long, default_value = "8")]
        entities: usize,
    },
    /// Build a demo scene and save it to a scene file
    Save {
        /// Output scene file path
        path: PathBuf,
        /// Number of prop entities to spawn
        #[arg(short, long, default_value = "8")]
        entities: usize,
    },
    /// Load a scene file and print its contents
    Inspect {
        /// Scene file path
        path: PathBuf,
        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("worldkit-cli v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Demo { ticks, entities } => {
            let mut world = demo_world(entities);
            for _ in 0..ticks {
                world.tick(1.0 / 60.0);
            }
            println!("{}", WorldInspector::summary(&world));
            print!("{}", WorldInspector::hierarchy(&world));
            let bounds = world.bounding_box();
            if !bounds.is_empty() {
                println!("bounds: min={:?} max={:?}", bounds.min, bounds.max);
            }
        }
        Commands::Save { path, entities } => {
            let mut world = demo_world(entities);
            world.tick(1.0 / 60.0);
            worldkit_persist::save_world(&mut world, &path)?;
            println!(
                "saved '{}' ({} entities) to {}",
                world.name(),
                world.entity_count(),
                path.display()
            );
        }
        Commands::Inspect { path, json } => {
            let world = worldkit_persist::load_world(&path)?;
            let summary = WorldInspector::summary(&world);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{summary}");
                print!("{}", WorldInspector::hierarchy(&world));
            }
        }
    }

    Ok(())
}

/// A small scene: camera, sun, and a ring of props under a shared root.
fn demo_world(entities: usize) -> World {
    let mut world = World::with_name("demo");

    let camera = world.create_entity_named("camera");
    let _ = world.set_camera(camera, Camera::default());
    if let Some(e) = world.get_entity_mut(camera) {
        e.transform.position = Vec3::new(0.0, 5.0, 12.0);
    }

    let sun = world.create_entity_named("sun");
    let _ = world.set_light(sun, Light::directional(Vec3::new(1.0, 0.96, 0.9), 3.0));

    let root = world.create_entity_named("props");
    let _ = world.set_audio_source(root, AudioSource::new("ambience/wind.ogg"));

    for i in 0..entities {
        let prop = world.create_entity_named(format!("prop_{i}"));
        let angle = i as f32 / entities.max(1) as f32 * std::f32::consts::TAU;
        if let Some(e) = world.get_entity_mut(prop) {
            e.transform.position = Vec3::new(angle.cos() * 6.0, 0.0, angle.sin() * 6.0);
        }
        let _ = world.set_material(prop, Material::default());
        let _ = world.set_parent(prop, Some(root));
    }

    world
}
