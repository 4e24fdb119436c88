// Marksync services
// Services are stateless or self-contained helpers: address routing, query planning, change notification, settings, localization.

pub mod change_notifier;
pub mod localization_engine;
pub mod query_planner;
pub mod resource_router;
pub mod settings_engine;
