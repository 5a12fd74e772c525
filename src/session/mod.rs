//! Per-run application state. One interactive session = one master upload
//! plus whatever fetches ran against it; handlers take `&mut Session` rather
//! than stashing intermediates in globals.

use crate::models::MasterRow;
use crate::pipeline::FetchReport;
use crate::review::ReviewCursor;

#[derive(Default)]
pub struct Session {
    pub master: Vec<MasterRow>,
    pub report: Option<FetchReport>,
    pub review: Option<ReviewCursor>,
}

impl Session {
    pub fn new(master: Vec<MasterRow>) -> Self {
        Self {
            master,
            report: None,
            review: None,
        }
    }
}
