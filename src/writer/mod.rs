pub mod table_writer;
pub mod xml_writer;
