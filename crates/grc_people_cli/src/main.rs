//! CLI probe for `grc_people_core`.
//!
//! # Usage
//! - `grc_people_cli ping`
//! - `grc_people_cli assignees <db_path> <entity_type> <entity_id> <role>`
//!
//! Set `GRC_PEOPLE_LOG_DIR` to an absolute path to enable file logging.

use grc_people_core::db::open_db;
use grc_people_core::{
    default_log_level, init_logging, EntityRef, GroupOptions, OwningEntity, PeopleGroup,
    SqliteRecordStore,
};
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str =
    "usage: grc_people_cli ping | assignees <db_path> <entity_type> <entity_id> <role>";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("GRC_PEOPLE_LOG_DIR") {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = match args.first().map(String::as_str) {
        Some("ping") => {
            println!("grc_people_core ping={}", grc_people_core::ping());
            println!("grc_people_core version={}", grc_people_core::core_version());
            Ok(())
        }
        Some("assignees") if args.len() == 5 => {
            print_assignees(&args[1], &args[2], &args[3], &args[4])
        }
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_assignees(
    db_path: &str,
    entity_type: &str,
    entity_id: &str,
    role: &str,
) -> Result<(), Box<dyn Error>> {
    let entity_id: i64 = entity_id
        .parse()
        .map_err(|_| format!("entity id must be an integer, got `{entity_id}`"))?;

    let conn = open_db(db_path)?;
    let store = SqliteRecordStore::try_new(&conn)?;
    let instance = OwningEntity::new(EntityRef::new(entity_type, entity_id));
    let mut group = PeopleGroup::new(store, instance, GroupOptions::for_role(role))?;
    group.inserted()?;

    for person in group.results() {
        println!("{}\t{}\t{}", person.id, person.name, person.email);
    }
    Ok(())
}
