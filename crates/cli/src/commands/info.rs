//! `info` command - summarize a destination file.

use anyhow::Result;

use navigation::geo::{haversine_distance_m, initial_bearing_deg};
use navigation::RouteLoader;

use crate::cli::InfoArgs;

/// Display destination information: waypoints, legs, computed totals
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let destination = RouteLoader::load_from_path(&args.route)?;

    let legs: Vec<(f64, f64)> = destination
        .waypoints
        .windows(2)
        .map(|pair| {
            let from = pair[0].coordinates();
            let to = pair[1].coordinates();
            (
                haversine_distance_m(from, to),
                initial_bearing_deg(from, to),
            )
        })
        .collect();
    let computed_total: f64 = legs.iter().map(|(distance, _)| distance).sum();

    if args.json {
        let report = serde_json::json!({
            "destination": destination,
            "computedTotalMeters": computed_total,
            "legs": legs
                .iter()
                .map(|(distance, bearing)| serde_json::json!({
                    "distanceMeters": distance,
                    "bearingDeg": bearing,
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Destination: {}", destination.name);
    println!("Transport:   {:?}", destination.transport_mode);
    if let Some(planned) = destination.total_distance_meters {
        println!("Planned:     {planned:.0} m");
    }
    println!("Computed:    {computed_total:.0} m over {} legs", legs.len());
    println!();

    for (idx, waypoint) in destination.waypoints.iter().enumerate() {
        let name = waypoint.name.as_deref().unwrap_or("unnamed");
        println!(
            "  [{idx}] {:?} {name} ({:.5}, {:.5})",
            waypoint.kind, waypoint.latitude, waypoint.longitude
        );
        if let Some((distance, bearing)) = legs.get(idx) {
            println!("       -> {distance:.0} m at {bearing:.0} deg");
        }
    }

    Ok(())
}
