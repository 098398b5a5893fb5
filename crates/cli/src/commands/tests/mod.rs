mod test_init;
