pub mod delete_dialog;
pub mod group_dialog;
pub mod group_list;
pub mod login;
pub mod main_window;
