// Roster import and export for course teams
//
// The CSV layout is `user,mode,<teamset id>...`, one learner per line and the
// team name for each teamset in its column.

pub mod errors;
pub mod exporter;
pub mod importer;
pub mod issues;
pub mod table;

pub use errors::{RosterError, RosterResult};
pub use exporter::RosterExporter;
pub use importer::{ImportResult, RosterImporter, DEFAULT_MAX_ERRORS, IMPORT_TEAM_DESCRIPTION};
pub use issues::RosterIssue;
pub use table::{RosterRow, RosterTable};
