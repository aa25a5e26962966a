mod checksum;
mod network_header;
mod reassembly;
mod sim_time;
