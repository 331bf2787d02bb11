pub mod planner;
pub mod route_metrics;
