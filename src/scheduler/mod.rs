pub mod quota_poller;
