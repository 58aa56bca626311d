use crate::VolatileReadWrite;

mod descriptor;
pub use descriptor::{Reader as TxDescriptorReader, TxDescriptor, Writer as TxDescriptorWriter};

mod descriptor_table;
pub use descriptor_table::TxDescriptorTable;
