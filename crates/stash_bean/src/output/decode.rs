//! A minimal reader of the primitive stream, for tests.

pub(crate) struct Decoder<'a> {
    bytes: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn read_raw(&mut self, len: usize) -> &'a [u8] {
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        head
    }

    pub(crate) fn read_u8(&mut self) -> u8 {
        self.read_raw(1)[0]
    }

    pub(crate) fn read_bool(&mut self) -> bool {
        match self.read_u8() {
            0 => false,
            1 => true,
            other => panic!("invalid bool byte {other}"),
        }
    }

    pub(crate) fn read_u64(&mut self) -> u64 {
        let mut value = 0_u64;
        let mut shift = 0;
        loop {
            let byte = self.read_u8();
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return value;
            }
            shift += 7;
        }
    }

    pub(crate) fn read_i64(&mut self) -> i64 {
        let value = self.read_u64();
        ((value >> 1) as i64) ^ -((value & 1) as i64)
    }

    pub(crate) fn read_len(&mut self) -> usize {
        self.read_u64() as usize
    }

    pub(crate) fn read_f64(&mut self) -> f64 {
        let bytes = self.read_raw(8);
        f64::from_le_bytes(bytes.try_into().unwrap())
    }

    pub(crate) fn read_bytes(&mut self) -> &'a [u8] {
        let len = self.read_len();
        self.read_raw(len)
    }

    pub(crate) fn read_string(&mut self) -> &'a str {
        core::str::from_utf8(self.read_bytes()).unwrap()
    }
}
