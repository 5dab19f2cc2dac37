pub mod min_value_filter;
pub mod missing_field_filter;
pub mod selection_log_side_effect;
pub mod series_source;
pub mod top_n_selector;
