pub mod campaigns;
pub mod common;
pub mod recommend;
pub mod report;
