mod test_join_rejections;
mod test_teardown;
