use crate::{error::Fault, Address, Byte};

pub struct Memory {
    data: Vec<Byte>,
}

impl Memory {
    pub const SIZE: usize = 256;

    pub fn new() -> Self {
        Self {
            data: vec![0; Self::SIZE],
        }
    }

    fn address_to_index(address: Address) -> Result<usize, Fault> {
        let index = address as usize;
        if index < Self::SIZE {
            Ok(index)
        } else {
            Err(Fault::OutOfRange { address })
        }
    }

    pub fn read(&self, address: Address) -> Result<Byte, Fault> {
        Ok(self.data[Self::address_to_index(address)?])
    }

    pub fn write(&mut self, address: Address, value: Byte) -> Result<(), Fault> {
        let index = Self::address_to_index(address)?;
        self.data[index] = value;
        Ok(())
    }

    /// Copies `bytes` into consecutive cells starting at `address`.
    pub fn write_slice(&mut self, address: Address, bytes: &[Byte]) -> Result<(), Fault> {
        for (offset, &byte) in bytes.iter().enumerate() {
            let target = address as usize + offset;
            let target = Address::try_from(target).map_err(|_| Fault::OutOfRange {
                address: Address::MAX,
            })?;
            self.write(target, byte)?;
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[Byte] {
        &self.data
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl<Index> std::ops::Index<Index> for Memory
where
    Index: std::slice::SliceIndex<[Byte]>,
{
    type Output = Index::Output;

    fn index(&self, index: Index) -> &Self::Output {
        &self.data[index]
    }
}
