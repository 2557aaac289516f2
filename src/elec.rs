pub mod data_kind;
