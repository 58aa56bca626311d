use crate::VolatileReadWrite;

mod descriptor;
pub use descriptor::{Reader as RxDescriptorReader, RxDescriptor, Writer as RxDescriptorWriter};

mod descriptor_table;
pub use descriptor_table::RxDescriptorTable;
