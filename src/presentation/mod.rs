/// Instrument catalog: banks, price types and instruments
pub mod instrument;
/// Price observations and their assembly
pub mod price;
/// Run reports and tabular rendering
pub mod report;
