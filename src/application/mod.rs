// Application layer: the assignment engine, from footprints to histories

pub mod diversity;
pub mod error;
pub mod extractor;
pub mod footprint;
pub mod model_builder;
pub mod planner;

pub use error::AssignmentError;
pub use extractor::Assignment;
pub use footprint::{Footprint, FootprintCatalog, SeatGraph};
pub use model_builder::AssignmentModel;
pub use planner::{AssignmentReport, Planner, PlannerConfig};
