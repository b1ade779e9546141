pub mod aggregator;
pub mod histogram;
pub mod stat;
pub mod stat_group;
