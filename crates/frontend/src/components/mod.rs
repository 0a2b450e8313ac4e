pub mod status_legend;
pub mod task_panel;
pub mod tasks_map;
