//! `validate` command - check a destination file without running.

use anyhow::Result;

use navigation::RouteLoader;

use crate::cli::ValidateArgs;

/// Validate a destination file
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    match RouteLoader::load_from_path(&args.route) {
        Ok(destination) => {
            if args.json {
                let report = serde_json::json!({
                    "valid": true,
                    "name": destination.name,
                    "waypoints": destination.waypoints.len(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "OK: '{}' with {} waypoints",
                    destination.name,
                    destination.waypoints.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            if args.json {
                let report = serde_json::json!({
                    "valid": false,
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                eprintln!("INVALID: {e}");
            }
            Err(e.into())
        }
    }
}
