pub mod login_activity;
