pub mod ad_group;
pub mod keyword;
pub mod language;
pub mod term;
