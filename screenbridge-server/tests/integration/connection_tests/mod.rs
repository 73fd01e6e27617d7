mod test_host_disconnect_closes_room;
mod test_host_requests_code;
mod test_viewer_disconnect_reopens_room;
