pub mod lead_capture;
