pub mod top_series;
