//! Interactive decompression planner.
//!
//! Plans a square dive on a single gas and prints the stop schedule for a
//! 3 m stop ladder.
//!
//! Run with: `cargo run --example planner`

use std::io::{self, Write};
use zhl16_deco::{
    stop_ladder, DecoConfig, DecoError, DecompressionScheduler, DiveState, Environment,
    NoDecoLimit, StopRounding, FN2,
};
use zhl16_deco::simulate::square_profile;

fn get_float_input(prompt: &str, default: f64) -> f64 {
    loop {
        print!("{} (default: {}): ", prompt, default);
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();

        let input = input.trim();
        if input.is_empty() {
            return default;
        }

        match input.parse::<f64>() {
            Ok(value) => return value,
            Err(_) => println!("Invalid input. Please enter a valid number."),
        }
    }
}

fn main() {
    println!("=== ZH-L16 Decompression Planner ===\n");

    println!("Enter dive parameters:");
    let surface_pressure = get_float_input("Surface pressure (bar)", 1.0);
    let inert_fraction = get_float_input("Inert gas fraction", FN2);
    let safety_factor = get_float_input("Safety factor (%)", 100.0);
    let depth = get_float_input("Bottom depth (m)", 40.0);
    let bottom_time = get_float_input("Bottom time (minutes)", 30.0);
    let descent_rate = get_float_input("Descent rate (m/min)", 18.0);
    let granularity = get_float_input("Stop granularity (minutes, 0 for exact)", 1.0);

    if let Err(err) = plan(
        surface_pressure,
        inert_fraction,
        safety_factor,
        depth,
        bottom_time,
        descent_rate,
        granularity,
    ) {
        println!("\nCould not plan dive: {}", err);
    }
}

fn plan(
    surface_pressure: f64,
    inert_fraction: f64,
    safety_factor: f64,
    depth: f64,
    bottom_time: f64,
    descent_rate: f64,
    granularity: f64,
) -> Result<(), DecoError> {
    let surface = DiveState::surface_equilibrium(inert_fraction, Environment::new(surface_pressure))?;

    match surface.advance(&square_profile(depth, 0.0, descent_rate, inert_fraction)?)?
        .no_decompression_limit(safety_factor)?
    {
        NoDecoLimit::Unlimited => println!("\nNo decompression limit: unlimited"),
        NoDecoLimit::Minutes(m) => println!("\nNo decompression limit: {:.1} minutes", m),
    }

    let state = surface.advance(&square_profile(
        depth,
        bottom_time,
        descent_rate,
        inert_fraction,
    )?)?;
    let (compartment, _) = state.controlling_compartment(safety_factor)?;
    println!(
        "Ceiling after bottom time: {:.1} m (compartment {})",
        state.ceiling_depth_meters(safety_factor)?,
        compartment + 1
    );

    let rounding = if granularity > 0.0 {
        StopRounding::Up {
            granularity_minutes: granularity,
        }
    } else {
        StopRounding::Exact
    };
    let scheduler =
        DecompressionScheduler::new(DecoConfig::new(safety_factor).with_rounding(rounding));
    let ladder = stop_ladder(3.0, depth.max(3.0))?;
    let schedule = scheduler.compute_schedule(&state, &ladder)?;

    if schedule.is_empty() {
        println!("Result: No decompression required");
        return Ok(());
    }

    println!("\n  Depth   Time   Compartment");
    for stop in schedule.iter() {
        let governing = stop
            .governing_compartment
            .map(|i| (i + 1).to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>4.0} m {:>5.1}   {}",
            stop.depth_meters, stop.duration_minutes, governing
        );
    }
    println!("Total decompression: {:.1} minutes", schedule.total_minutes());
    Ok(())
}
