//! Basic demonstration of the Rampart simulation.
//!
//! Run with: cargo run --example basic_demo

use rampart_sim::{GameMode, SimConfig, SimWorld, TowerKind, UpgradeTrack};

fn main() {
    println!("=== Rampart - Tower Defense Simulation Demo ===\n");

    // An S-shaped route across a 960x540 board.
    let waypoints = vec![
        (60.0, 160.0),
        (270.0, 160.0),
        (270.0, 320.0),
        (530.0, 320.0),
        (530.0, 190.0),
        (790.0, 190.0),
        (790.0, 390.0),
        (940.0, 390.0),
    ];

    let config = SimConfig {
        mode: GameMode::Endless,
        starting_money: 300,
        seed: 42,
        ..SimConfig::default()
    };
    let mut sim = SimWorld::new(&waypoints, config).expect("demo path is valid");

    // Build a small defense around the first two corners.
    let basic = sim.place_tower(200.0, 100.0, TowerKind::Basic).unwrap();
    sim.place_tower(330.0, 250.0, TowerKind::Frost).unwrap();
    sim.place_tower(210.0, 250.0, TowerKind::Buff).unwrap();
    sim.upgrade_tower(basic, UpgradeTrack::Power).unwrap();

    println!("Initial state:");
    print_snapshot(&mut sim);

    println!("\n--- Starting the first wave ---\n");
    sim.start_next_wave();

    // Run 1800 ticks (60 seconds at 30 Hz); endless mode chains waves by
    // itself once the field clears.
    for tick in 0..1800 {
        sim.step(1.0 / 30.0);

        if (tick + 1) % 300 == 0 {
            println!(
                "--- Tick {} (t={:.1}s, wave {}, {}) ---",
                sim.current_tick(),
                sim.current_time(),
                sim.wave(),
                sim.status().label()
            );
            print_snapshot(&mut sim);
        }
        if sim.status().is_over() {
            break;
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().unwrap());
}

fn print_snapshot(sim: &mut SimWorld) {
    let snapshot = sim.snapshot();

    println!(
        "  money=${} lives={} wave={} phase={}",
        snapshot.money, snapshot.lives, snapshot.wave, snapshot.phase
    );
    for tower in &snapshot.towers {
        println!(
            "    tower {}: {} at ({:.0}, {:.0}) dmg={} rng={:.0} p{}/u{}",
            tower.id,
            tower.kind,
            tower.x,
            tower.y,
            tower.damage,
            tower.range,
            tower.power_level,
            tower.utility_level
        );
    }
    for enemy in snapshot.enemies.iter().take(6) {
        println!(
            "    enemy {}: {} hp={}/{} t={:.2}{}",
            enemy.id,
            enemy.kind,
            enemy.hp,
            enemy.hp_max,
            enemy.progress,
            if enemy.slowed { " (slowed)" } else { "" }
        );
    }
    if snapshot.enemies.len() > 6 {
        println!("    ... and {} more enemies", snapshot.enemies.len() - 6);
    }
}
