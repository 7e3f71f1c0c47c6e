mod data_rate;
mod power;

pub use self::{
    data_rate::{DataRate, DataRateParseError},
    power::Dbm,
};
