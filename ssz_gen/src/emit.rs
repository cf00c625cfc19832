use crate::context::GenContext;
use crate::plan::{EncodingPlan, Placement, PlannedField};
use ssz_types::{ScalarType, Shape};
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to render generated code: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Renders the `impl Ssz` block for one encoding plan.
pub struct Emitter<'a> {
    plan: &'a EncodingPlan,
    ctx: &'a mut GenContext,
}

impl<'a> Emitter<'a> {
    pub fn new(plan: &'a EncodingPlan, ctx: &'a mut GenContext) -> Self {
        Self { plan, ctx }
    }

    pub fn emit(mut self) -> Result<String, EmitError> {
        let plan = self.plan;
        self.ctx.use_path(plan.type_path.clone());
        let ssz = self.ctx.use_runtime("Ssz");

        let mut out = String::new();
        writeln!(out, "impl {} for {} {{", ssz, plan.type_name)?;
        if plan.is_fixed() {
            writeln!(
                out,
                "    const FIXED_SIZE: Option<usize> = Some({});",
                plan.fixed_size
            )?;
        } else {
            writeln!(out, "    const FIXED_SIZE: Option<usize> = None;")?;
        }
        writeln!(out)?;
        self.emit_size(&mut out)?;
        writeln!(out)?;
        self.emit_marshal(&mut out)?;
        writeln!(out)?;
        self.emit_unmarshal(&mut out)?;
        writeln!(out, "}}")?;
        Ok(out)
    }

    fn emit_size(&self, out: &mut String) -> Result<(), EmitError> {
        let plan = self.plan;
        let mut expr = plan.fixed_size.to_string();
        for field in plan.variable_fields() {
            write!(expr, " + self.{}.ssz_size()", field.name)?;
        }
        writeln!(out, "    fn ssz_size(&self) -> usize {{")?;
        writeln!(out, "        {}", expr)?;
        writeln!(out, "    }}")?;
        Ok(())
    }

    fn emit_marshal(&mut self, out: &mut String) -> Result<(), EmitError> {
        let plan = self.plan;
        let encode_error = self.ctx.use_runtime("EncodeError");
        let buf = if plan.fields.is_empty() {
            "_buf"
        } else {
            "buf"
        };
        writeln!(
            out,
            "    fn marshal_ssz_to(&self, {}: &mut Vec<u8>) -> Result<(), {}> {{",
            buf, encode_error
        )?;

        for field in plan.variable_fields() {
            if let Some(max) = field.max {
                let check = self.ctx.use_runtime("check_max_encode");
                writeln!(out, "        {}(self.{}.len(), {})?;", check, field.name, max)?;
            }
        }

        let variable_count = plan.variable.len();
        if variable_count > 1 {
            writeln!(out, "        let mut offset = {};", plan.fixed_size)?;
        }

        for field in &plan.fields {
            match field.placement {
                Placement::Fixed { .. } => {
                    let stmt = encode_fixed(field);
                    writeln!(out, "        {}", stmt)?;
                }
                Placement::Variable { slot, .. } => {
                    let write_offset = self.ctx.use_runtime("write_offset");
                    if variable_count == 1 {
                        writeln!(
                            out,
                            "        {}(buf, {})?;",
                            write_offset, plan.fixed_size
                        )?;
                    } else {
                        writeln!(out, "        {}(buf, offset)?;", write_offset)?;
                        if slot + 1 < variable_count {
                            writeln!(out, "        offset += self.{}.ssz_size();", field.name)?;
                        }
                    }
                }
            }
        }

        for field in plan.variable_fields() {
            writeln!(out, "        self.{}.marshal_ssz_to(buf)?;", field.name)?;
        }
        writeln!(out, "        Ok(())")?;
        writeln!(out, "    }}")?;
        Ok(())
    }

    fn emit_unmarshal(&mut self, out: &mut String) -> Result<(), EmitError> {
        let plan = self.plan;
        let decode_error = self.ctx.use_runtime("DecodeError");
        writeln!(
            out,
            "    fn unmarshal_ssz(buf: &[u8]) -> Result<Self, {}> {{",
            decode_error
        )?;

        let len_check = if plan.is_fixed() {
            self.ctx.use_runtime("check_fixed_len")
        } else {
            self.ctx.use_runtime("check_min_len")
        };
        writeln!(out, "        {}(buf, {})?;", len_check, plan.fixed_size)?;

        /* Fixed fields sit at static offsets */
        for field in &plan.fields {
            if let Placement::Fixed { offset, size } = field.placement {
                let expr = self.decode_fixed(field, offset, size);
                writeln!(out, "        let {} = {};", local_name(&field.name), expr)?;
            }
        }

        /* Offset table, validated before any payload is sliced */
        if !plan.is_fixed() {
            let read_offset = self.ctx.use_runtime("read_offset");
            for field in plan.variable_fields() {
                if let Placement::Variable { slot, offset } = field.placement {
                    writeln!(
                        out,
                        "        let offset_{} = {}(buf, {});",
                        slot, read_offset, offset
                    )?;
                }
            }
            let first = self.ctx.use_runtime("check_first_offset");
            writeln!(
                out,
                "        {}(offset_0, {}, buf.len())?;",
                first, plan.fixed_size
            )?;
            for slot in 1..plan.variable.len() {
                let check = self.ctx.use_runtime("check_offset");
                writeln!(
                    out,
                    "        {}(offset_{}, offset_{}, buf.len())?;",
                    check,
                    slot,
                    slot - 1
                )?;
            }

            let last = plan.variable.len() - 1;
            for (slot, field) in plan.variable_fields().enumerate() {
                let range = if slot == last {
                    format!("offset_{}..", slot)
                } else {
                    format!("offset_{}..offset_{}", slot, slot + 1)
                };
                writeln!(
                    out,
                    "        let {} = Ssz::unmarshal_ssz(&buf[{}])?;",
                    local_name(&field.name),
                    range
                )?;
            }
        }

        let literal = self.struct_literal();
        let limited: Vec<&PlannedField> = plan
            .variable_fields()
            .filter(|f| f.max.is_some())
            .collect();
        if limited.is_empty() {
            writeln!(out, "        Ok({})", literal)?;
        } else {
            /* Limits are checked on the constructed value */
            let check = self.ctx.use_runtime("check_max_decode");
            writeln!(out, "        let value = {};", literal)?;
            for field in limited {
                if let Some(max) = field.max {
                    writeln!(out, "        {}(value.{}.len(), {})?;", check, field.name, max)?;
                }
            }
            writeln!(out, "        Ok(value)")?;
        }
        writeln!(out, "    }}")?;
        Ok(())
    }

    fn decode_fixed(&mut self, field: &PlannedField, offset: usize, size: usize) -> String {
        match &field.shape {
            Shape::Scalar(ScalarType::Bool) => {
                let decode_bool = self.ctx.use_runtime("decode_bool");
                format!("{}(buf[{}])?", decode_bool, offset)
            }
            Shape::Scalar(scalar) => {
                let read_array = self.ctx.use_runtime("read_array");
                format!(
                    "{}::from_le_bytes({}(buf, {}))",
                    scalar.rust_name(),
                    read_array,
                    offset
                )
            }
            Shape::ByteArray(_) => {
                let read_array = self.ctx.use_runtime("read_array");
                format!("{}(buf, {})", read_array, offset)
            }
            _ => format!("Ssz::unmarshal_ssz(&buf[{}..{}])?", offset, offset + size),
        }
    }

    /* `Self { .. }` built from the decoded locals */
    fn struct_literal(&self) -> String {
        let plan = self.plan;
        if plan.fields.is_empty() {
            return "Self {}".to_string();
        }
        let inits: Vec<String> = plan
            .fields
            .iter()
            .map(|field| {
                let local = local_name(&field.name);
                if local == field.name {
                    local
                } else {
                    format!("{}: {}", field.name, local)
                }
            })
            .collect();
        format!("Self {{ {} }}", inits.join(", "))
    }
}

pub fn emit_impl(plan: &EncodingPlan, ctx: &mut GenContext) -> Result<String, EmitError> {
    Emitter::new(plan, ctx).emit()
}

fn encode_fixed(field: &PlannedField) -> String {
    match &field.shape {
        Shape::Scalar(ScalarType::Bool) => format!("buf.push(u8::from(self.{}));", field.name),
        Shape::Scalar(_) => format!("buf.extend_from_slice(&self.{}.to_le_bytes());", field.name),
        Shape::ByteArray(_) => format!("buf.extend_from_slice(&self.{});", field.name),
        _ => format!("self.{}.marshal_ssz_to(buf)?;", field.name),
    }
}

/* Local binding for a decoded field; renamed when it would clash with generated names */
fn local_name(field: &str) -> String {
    let bare = field.strip_prefix("r#").unwrap_or(field);
    if bare == "buf" || bare == "value" || bare.starts_with("offset") || bare.starts_with("field_")
    {
        format!("field_{}", bare)
    } else {
        field.to_string()
    }
}
