mod helpers;

mod access_test;
mod auth_test;
mod catalog_test;
mod health_test;
mod link_test;
mod link_usecase_test;
mod repository_test;
mod scenario_test;
