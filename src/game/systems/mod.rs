pub mod kinetics;
pub mod collision;
pub mod pilot;
pub mod lifecycle;
