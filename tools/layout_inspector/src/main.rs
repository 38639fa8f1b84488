use std::env;

use glam::Vec3;
use townwalk_shared::layout::{ColliderKind, TownLayout, GROUND_LEVEL, SPAWN_POSITION};
use townwalk_shared::physics::AABB;

const SECTIONS: &str = "summary | colliders | houses | trees | lamps | roads";

fn main() {
    let section = env::args().nth(1).unwrap_or_else(|| "summary".to_string());

    if let Err(err) = run(&section) {
        eprintln!("layout_inspector error: {err}");
        eprintln!("Usage: layout_inspector [{SECTIONS}]");
        std::process::exit(1);
    }
}

fn run(section: &str) -> Result<(), String> {
    let layout = TownLayout::town();

    match section {
        "summary" => print_summary(&layout),
        "colliders" => {
            for collider in layout.colliders() {
                println!(
                    "  {:<6} {}",
                    kind_label(collider.kind),
                    format_bounds(&collider.bounds)
                );
            }
        }
        "houses" => {
            for house in &layout.houses {
                println!(
                    "  house @ ({:.1}, {:.1}) rot={:.2} color={}",
                    house.x, house.z, house.rotation_y, house.color
                );
            }
        }
        "trees" => {
            for tree in &layout.trees {
                println!(
                    "  {:?} @ ({:.1}, {:.1}) scale={:.2}",
                    tree.kind, tree.x, tree.z, tree.scale
                );
            }
        }
        "lamps" => {
            println!("  central @ {}", format_vec(layout.central_lamp));
            for lamp in &layout.lamps {
                println!("  lamp @ {} rot={:.2}", format_vec(lamp.position), lamp.rotation_y);
            }
        }
        "roads" => {
            for surface in &layout.surfaces {
                println!(
                    "  {} {:.1}x{:.1} @ {}",
                    surface.color,
                    surface.size.x,
                    surface.size.y,
                    format_vec(surface.center)
                );
            }
        }
        other => return Err(format!("unknown section '{other}'")),
    }

    Ok(())
}

fn print_summary(layout: &TownLayout) {
    let colliders = layout.colliders();
    let count = |kind: ColliderKind| colliders.iter().filter(|c| c.kind == kind).count();

    println!("Town layout");
    println!("Ground level: {GROUND_LEVEL:.1}");
    println!("Spawn: {}", format_vec(SPAWN_POSITION));
    println!("Houses: {}", layout.houses.len());
    println!("Trees: {}", layout.trees.len());
    println!("Lamps: {} (+ central)", layout.lamps.len());
    println!("Road surfaces: {}", layout.surfaces.len());
    println!(
        "Colliders: {} (ground {}, walls {}, houses {}, trees {}, lamps {})",
        colliders.len(),
        count(ColliderKind::Ground),
        count(ColliderKind::Wall),
        count(ColliderKind::House),
        count(ColliderKind::Tree),
        count(ColliderKind::Lamp),
    );
    println!("Spawn inside town: {}", layout.contains(SPAWN_POSITION));
}

fn kind_label(kind: ColliderKind) -> &'static str {
    match kind {
        ColliderKind::Ground => "ground",
        ColliderKind::Wall => "wall",
        ColliderKind::House => "house",
        ColliderKind::Tree => "tree",
        ColliderKind::Lamp => "lamp",
    }
}

fn format_vec(v: Vec3) -> String {
    format!("({:.1}, {:.1}, {:.1})", v.x, v.y, v.z)
}

fn format_bounds(bounds: &AABB) -> String {
    format!("{} .. {}", format_vec(bounds.min), format_vec(bounds.max))
}
