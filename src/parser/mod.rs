pub mod tecplot;
