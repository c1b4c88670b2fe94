pub mod command;
pub mod geometry_commands;
pub mod material_commands;
pub mod object_commands;
pub mod property_commands;
pub mod registry;
pub mod scene_commands;
pub mod script_commands;
pub mod transform_commands;
