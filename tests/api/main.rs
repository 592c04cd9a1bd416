mod admin_dashboard;
mod health_check;
mod helpers;
mod logout;
