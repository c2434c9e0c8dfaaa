pub mod report_testkit;
