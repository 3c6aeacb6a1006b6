use std::sync::Arc;

use crate::Value;
use crate::bean::BeanDescriptor;
use crate::deferred;
use crate::write::{PropertyKind, WriteContext, WriteError};

/// Writes the fields of one bean type as a property stream.
///
/// Writers are stateless apart from their descriptor, one instance serves
/// any number of concurrent write passes.
#[derive(Debug)]
pub struct BeanPropertyWriter {
    descriptor: Arc<BeanDescriptor>,
}

impl BeanPropertyWriter {
    #[inline]
    pub fn new(descriptor: Arc<BeanDescriptor>) -> Self {
        Self { descriptor }
    }

    #[inline]
    pub fn descriptor(&self) -> &Arc<BeanDescriptor> {
        &self.descriptor
    }

    /// Writes one property per field of `bean`, in declaration order, then
    /// the empty name.
    ///
    /// A field whose value unwraps to absence falls back to the bean's
    /// convention value, if the bean supports conventions. Fields without
    /// a codec are handled by the [`MissingCodecPolicy`](crate::write::MissingCodecPolicy).
    ///
    /// On error, the stream is left without its terminating empty name.
    pub fn write_fields_of(&self, ctx: &mut WriteContext<'_>, bean: &dyn Value) -> Result<(), WriteError> {
        let descriptor = &*self.descriptor;

        let max_depth = ctx.settings().max_depth;
        if ctx.trace().bean_depth() >= max_depth {
            return Err(WriteError::TooDeep {
                trace: ctx.trace().to_string(),
                max_depth,
            });
        }

        let conventions = descriptor.conventions(bean);

        ctx.with_bean_trace(descriptor.type_path(), |ctx| {
            ctx.writing_properties(|ctx| {
                for field in descriptor.fields() {
                    let name = field.name();
                    let Some(raw) = field.read(bean) else {
                        return Err(WriteError::FieldAccess {
                            bean: descriptor.type_path(),
                            field: name,
                            type_path: bean.value_type_path(),
                        });
                    };

                    let Some(conventions) = conventions else {
                        ctx.write_next_property(name, Some(raw), PropertyKind::Field)?;
                        continue;
                    };

                    let written = deferred::unwrap(Some(raw), |value| match value {
                        Some(value) => ctx.write_next_property(name, Some(value), PropertyKind::Field),
                        None => {
                            let fallback = conventions.convention_value(name);
                            ctx.write_next_property(name, fallback.as_deref(), PropertyKind::Field)
                        }
                    });
                    written.map_err(|source| ctx.unwrap_error(PropertyKind::Field, name.into(), source))??;
                }
                Ok(())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use std::sync::Arc;

    use crate::Value;
    use crate::bean::{BeanDescriptor, ConventionAware, ConventionMapping};
    use crate::codec::CodecRegistry;
    use crate::deferred::Provider;
    use crate::output::BinaryEncoder;
    use crate::output::decode::Decoder;
    use crate::write::{BeanPropertyWriter, BeanWriterCache, WriteContext};

    struct Settings {
        level: Provider,
        conventions: ConventionMapping,
    }

    crate::impl_value!(Settings);

    impl ConventionAware for Settings {
        fn convention_value(&self, property: &str) -> Option<Arc<dyn Value>> {
            self.conventions.convention_value(property)
        }
    }

    fn settings_writer() -> BeanPropertyWriter {
        let descriptor = BeanDescriptor::builder::<Settings>()
            .type_path("test::Settings")
            .field("level", |s| &s.level)
            .conventions()
            .build()
            .unwrap();
        BeanPropertyWriter::new(Arc::new(descriptor))
    }

    #[test]
    fn absent_field_falls_back_to_convention() {
        let codecs = CodecRegistry::new();
        let writers = BeanWriterCache::new(crate::bean::BeanRegistry::new());
        let writer = settings_writer();
        assert_eq!(writer.descriptor().type_id(), TypeId::of::<Settings>());

        let bean = Settings {
            level: Provider::absent(),
            conventions: ConventionMapping::new(),
        };
        bean.conventions.map("level", Provider::of(9_u8));

        let mut encoder = BinaryEncoder::new(Vec::new());
        let mut ctx = WriteContext::new(&mut encoder, &codecs, &writers);
        writer.write_fields_of(&mut ctx, &bean).unwrap();

        let bytes = encoder.into_inner();
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.read_string(), "level");
        let tag = decoder.read_u64() as u32;
        assert_eq!(codecs.get_with_tag(tag).map(|e| e.type_path()), Some("u8"));
        assert_eq!(decoder.read_u64(), 9);
        assert_eq!(decoder.read_string(), "");
        assert!(decoder.is_empty());
    }

    #[test]
    fn present_field_ignores_convention() {
        let codecs = CodecRegistry::new();
        let writers = BeanWriterCache::new(crate::bean::BeanRegistry::new());
        let writer = settings_writer();

        let bean = Settings {
            level: Provider::of(1_u8),
            conventions: ConventionMapping::new(),
        };
        bean.conventions.map_value("level", 9_u8);

        let mut encoder = BinaryEncoder::new(Vec::new());
        let mut ctx = WriteContext::new(&mut encoder, &codecs, &writers);
        writer.write_fields_of(&mut ctx, &bean).unwrap();

        let bytes = encoder.into_inner();
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.read_string(), "level");
        decoder.read_u64();
        assert_eq!(decoder.read_u64(), 1);
    }

    #[test]
    fn absent_without_convention_writes_null() {
        let codecs = CodecRegistry::new();
        let writers = BeanWriterCache::new(crate::bean::BeanRegistry::new());
        let writer = settings_writer();

        let bean = Settings {
            level: Provider::absent(),
            conventions: ConventionMapping::new(),
        };

        let mut encoder = BinaryEncoder::new(Vec::new());
        let mut ctx = WriteContext::new(&mut encoder, &codecs, &writers);
        writer.write_fields_of(&mut ctx, &bean).unwrap();

        let bytes = encoder.into_inner();
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.read_string(), "level");
        assert_eq!(decoder.read_u64(), u64::from(crate::codec::tag::NULL));
        assert_eq!(decoder.read_string(), "");
        assert!(decoder.is_empty());
    }

    #[test]
    fn wrong_instance_is_a_field_access_error() {
        let codecs = CodecRegistry::new();
        let writers = BeanWriterCache::new(crate::bean::BeanRegistry::new());
        let writer = settings_writer();

        let mut encoder = BinaryEncoder::new(Vec::new());
        let mut ctx = WriteContext::new(&mut encoder, &codecs, &writers);
        let error = writer.write_fields_of(&mut ctx, &5_i32).unwrap_err();

        assert!(matches!(
            error,
            crate::write::WriteError::FieldAccess { field: "level", type_path: "i32", .. }
        ));
        assert!(ctx.trace().is_empty());
    }
}
