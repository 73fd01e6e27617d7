mod test_relay_client_round_trip;
