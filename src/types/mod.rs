pub mod forecast_record;
pub mod forecast_run;
pub mod horizon;
pub mod model;
pub mod raw_sample;
pub mod site;
pub mod window;
