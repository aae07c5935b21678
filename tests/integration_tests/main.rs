mod infrastructure {
    mod file_io_stage_test;
    mod replicate_gateway_test;
}

mod presentation {
    mod api_test;
}
