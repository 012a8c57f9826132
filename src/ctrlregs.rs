//! Control, SQE-local and pipe register maps.
//!
//! Offsets are the 12-bit `base` field of `cread`/`cwrite` (control),
//! `sread`/`swrite` (SQE) and the top byte of an `$addr` pipe write. The maps
//! differ between hardware families, so lookups take a [`Generation`].

use crate::decoder::Generation;

#[derive(Debug, Clone, Copy)]
pub struct RegEntry {
    pub offset: u32,
    pub name: &'static str,
}

const A5XX_CTRL: &[RegEntry] = &[
    RegEntry { offset: 0x010, name: "REG_WRITE_ADDR" },
    RegEntry { offset: 0x011, name: "REG_WRITE" },
    RegEntry { offset: 0x038, name: "STORE_HI" },
    RegEntry { offset: 0x0b0, name: "IB1_BASE" },
    RegEntry { offset: 0x0b2, name: "IB1_DWORDS" },
    RegEntry { offset: 0x0b4, name: "IB2_BASE" },
    RegEntry { offset: 0x0b6, name: "IB2_DWORDS" },
    RegEntry { offset: 0x0b8, name: "MEM_READ_ADDR" },
    RegEntry { offset: 0x0ba, name: "MEM_READ_DWORDS" },
];

const A6XX_CTRL: &[RegEntry] = &[
    RegEntry { offset: 0x001, name: "RB_RPTR" },
    RegEntry { offset: 0x010, name: "IB1_BASE" },
    RegEntry { offset: 0x012, name: "IB1_DWORDS" },
    RegEntry { offset: 0x014, name: "IB2_BASE" },
    RegEntry { offset: 0x016, name: "IB2_DWORDS" },
    RegEntry { offset: 0x018, name: "MEM_READ_ADDR" },
    RegEntry { offset: 0x01a, name: "MEM_READ_DWORDS" },
    RegEntry { offset: 0x024, name: "REG_WRITE_ADDR" },
    RegEntry { offset: 0x025, name: "REG_WRITE" },
    RegEntry { offset: 0x026, name: "REG_READ_DWORDS" },
    RegEntry { offset: 0x027, name: "REG_READ_ADDR" },
    RegEntry { offset: 0x030, name: "WFI_PEND_INCR" },
    RegEntry { offset: 0x031, name: "QUERY_PEND_INCR" },
    RegEntry { offset: 0x032, name: "CACHE_FLUSH_PEND_INCR" },
    RegEntry { offset: 0x038, name: "WFI_PEND_CTR" },
    RegEntry { offset: 0x039, name: "QUERY_PEND_CTR" },
    RegEntry { offset: 0x03a, name: "CACHE_FLUSH_PEND_CTR" },
    RegEntry { offset: 0x041, name: "DRAW_STATE_SEL" },
    RegEntry { offset: 0x042, name: "SDS_BASE" },
    RegEntry { offset: 0x044, name: "SDS_DWORDS" },
    RegEntry { offset: 0x045, name: "DRAW_STATE_BASE" },
    RegEntry { offset: 0x047, name: "DRAW_STATE_HDR" },
    RegEntry { offset: 0x049, name: "DRAW_STATE_ACTIVE_BITMASK" },
    RegEntry { offset: 0x04a, name: "DRAW_STATE_SET_HDR" },
    RegEntry { offset: 0x04c, name: "DRAW_STATE_SET_HDR_LPAC" },
    RegEntry { offset: 0x04d, name: "DRAW_STATE_SET_PENDING" },
    RegEntry { offset: 0x04f, name: "DRAW_STATE_SET_BASE_LPAC" },
    RegEntry { offset: 0x054, name: "IB_LEVEL" },
    RegEntry { offset: 0x058, name: "LOAD_STORE_HI" },
    RegEntry { offset: 0x05b, name: "REG_READ_TEST_RESULT" },
    RegEntry { offset: 0x05d, name: "PERFCNTR_CNTL" },
    RegEntry { offset: 0x060, name: "PACKET_TABLE_WRITE_ADDR" },
    RegEntry { offset: 0x061, name: "PACKET_TABLE_WRITE" },
    RegEntry { offset: 0x062, name: "ZAP_SHADER_ADDR" },
    RegEntry { offset: 0x06e, name: "PREEMPTION_TIMER" },
    RegEntry { offset: 0x06f, name: "PREEMPTION_TIMER_CNTL" },
    RegEntry { offset: 0x070, name: "CONTEXT_SWITCH_CNTL" },
    RegEntry { offset: 0x071, name: "PREEMPT_ENABLE" },
    RegEntry { offset: 0x072, name: "PREEMPT_TRIGGER" },
    RegEntry { offset: 0x075, name: "SECURE_MODE" },
    RegEntry { offset: 0x078, name: "PREEMPT_COOKIE" },
    RegEntry { offset: 0x098, name: "MARKER" },
    RegEntry { offset: 0x110, name: "SAVE_REGISTER_SMMU_INFO" },
    RegEntry { offset: 0x112, name: "SAVE_REGISTER_PRIV_NON_SECURE" },
    RegEntry { offset: 0x114, name: "SAVE_REGISTER_PRIV_SECURE" },
    RegEntry { offset: 0x116, name: "SAVE_REGISTER_NON_PRIV" },
    RegEntry { offset: 0x118, name: "SAVE_REGISTER_COUNTER" },
    RegEntry { offset: 0x126, name: "PREEMPTION_INFO" },
    RegEntry { offset: 0x12a, name: "MARKER_TEMP" },
    RegEntry { offset: 0x12b, name: "MODE_BITMASK" },
    RegEntry { offset: 0x170, name: "SCRATCH_REG0" },
    RegEntry { offset: 0x171, name: "SCRATCH_REG1" },
    RegEntry { offset: 0x172, name: "SCRATCH_REG2" },
    RegEntry { offset: 0x173, name: "SCRATCH_REG3" },
    RegEntry { offset: 0x174, name: "SCRATCH_REG4" },
    RegEntry { offset: 0x175, name: "SCRATCH_REG5" },
    RegEntry { offset: 0x176, name: "SCRATCH_REG6" },
    RegEntry { offset: 0x177, name: "SCRATCH_REG7" },
    RegEntry { offset: 0x200, name: "THREAD_SYNC" },
];

const A7XX_CTRL: &[RegEntry] = &[
    RegEntry { offset: 0x001, name: "RB_RPTR" },
    RegEntry { offset: 0x004, name: "PREEMPT_INSTR" },
    RegEntry { offset: 0x010, name: "IB1_BASE" },
    RegEntry { offset: 0x012, name: "IB1_DWORDS" },
    RegEntry { offset: 0x014, name: "IB2_BASE" },
    RegEntry { offset: 0x016, name: "IB2_DWORDS" },
    RegEntry { offset: 0x018, name: "IB3_BASE" },
    RegEntry { offset: 0x01a, name: "IB3_DWORDS" },
    RegEntry { offset: 0x01c, name: "MEM_READ_ADDR" },
    RegEntry { offset: 0x01e, name: "MEM_READ_DWORDS" },
    RegEntry { offset: 0x030, name: "WFI_PEND_INCR" },
    RegEntry { offset: 0x031, name: "QUERY_PEND_INCR" },
    RegEntry { offset: 0x032, name: "CACHE_CLEAN_PEND_INCR" },
    RegEntry { offset: 0x036, name: "REG_WRITE_ADDR" },
    RegEntry { offset: 0x037, name: "REG_WRITE" },
    RegEntry { offset: 0x038, name: "REG_READ_DWORDS" },
    RegEntry { offset: 0x039, name: "REG_READ_ADDR" },
    RegEntry { offset: 0x03a, name: "CACHE_CLEAN_PEND_CTR" },
    RegEntry { offset: 0x03e, name: "WFI_PEND_CTR" },
    RegEntry { offset: 0x03f, name: "QUERY_PEND_CTR" },
    RegEntry { offset: 0x041, name: "DRAW_STATE_SEL" },
    RegEntry { offset: 0x042, name: "SDS_BASE" },
    RegEntry { offset: 0x044, name: "SDS_DWORDS" },
    RegEntry { offset: 0x045, name: "DRAW_STATE_BASE" },
    RegEntry { offset: 0x047, name: "DRAW_STATE_HDR" },
    RegEntry { offset: 0x049, name: "DRAW_STATE_ACTIVE_BITMASK" },
    RegEntry { offset: 0x04b, name: "MODE_BITMASK" },
    RegEntry { offset: 0x04c, name: "DRAW_STATE_SET_HDR" },
    RegEntry { offset: 0x04d, name: "DRAW_STATE_SET_PENDING" },
    RegEntry { offset: 0x04f, name: "DRAW_STATE_SET_BASE" },
    RegEntry { offset: 0x054, name: "IB_LEVEL" },
    RegEntry { offset: 0x058, name: "LOAD_STORE_HI" },
    RegEntry { offset: 0x05b, name: "REG_READ_TEST_RESULT" },
    RegEntry { offset: 0x05d, name: "PERFCNTR_CNTL" },
    RegEntry { offset: 0x060, name: "PACKET_TABLE_WRITE_ADDR" },
    RegEntry { offset: 0x061, name: "PACKET_TABLE_WRITE" },
    RegEntry { offset: 0x06e, name: "PREEMPTION_TIMER" },
    RegEntry { offset: 0x06f, name: "PREEMPTION_TIMER_CNTL" },
    RegEntry { offset: 0x070, name: "CONTEXT_SWITCH_CNTL" },
    RegEntry { offset: 0x071, name: "PREEMPT_ENABLE" },
    RegEntry { offset: 0x072, name: "PREEMPT_TRIGGER" },
    RegEntry { offset: 0x075, name: "SECURE_MODE" },
    RegEntry { offset: 0x078, name: "PREEMPT_COOKIE" },
    RegEntry { offset: 0x098, name: "MARKER" },
    RegEntry { offset: 0x0a0, name: "LOAD_STORE_RANGE_MIN" },
    RegEntry { offset: 0x0a1, name: "LOAD_STORE_RANGE_LEN" },
    RegEntry { offset: 0x0b1, name: "COPROCESSOR_LOCK" },
    RegEntry { offset: 0x0d4, name: "APERTURE_CNTL" },
    RegEntry { offset: 0x0d5, name: "APERTURE_CNTL_PREEMPT" },
    RegEntry { offset: 0x0d6, name: "BV_INSTR_BASE" },
    RegEntry { offset: 0x0d8, name: "BV_CNTL" },
    RegEntry { offset: 0x0d9, name: "LPAC_INSTR_BASE" },
    RegEntry { offset: 0x0db, name: "LPAC_CNTL" },
    RegEntry { offset: 0x0e2, name: "GLOBAL_TIMESTAMP" },
    RegEntry { offset: 0x0e3, name: "LOCAL_TIMESTAMP" },
    RegEntry { offset: 0x23f, name: "THREAD_SYNC" },
];

const SQE_REGS: &[RegEntry] = &[
    RegEntry { offset: 0x04, name: "PREEMPT_INSTR" },
    RegEntry { offset: 0x05, name: "SP" },
    RegEntry { offset: 0x08, name: "STACK0" },
    RegEntry { offset: 0x09, name: "STACK1" },
    RegEntry { offset: 0x0a, name: "STACK2" },
    RegEntry { offset: 0x0b, name: "STACK3" },
    RegEntry { offset: 0x0c, name: "STACK4" },
    RegEntry { offset: 0x0d, name: "STACK5" },
    RegEntry { offset: 0x0e, name: "STACK6" },
    RegEntry { offset: 0x0f, name: "STACK7" },
];

const A6XX_PIPE: &[RegEntry] = &[
    RegEntry { offset: 0x80, name: "WAIT_FOR_IDLE" },
    RegEntry { offset: 0x81, name: "WFI_PEND_DECR" },
    RegEntry { offset: 0x82, name: "QUERY_PEND_DECR" },
    RegEntry { offset: 0x84, name: "WAIT_MEM_WRITES" },
    RegEntry { offset: 0xa0, name: "NRT_ADDR" },
    RegEntry { offset: 0xa2, name: "NRT_DATA" },
    RegEntry { offset: 0xe7, name: "EVENT_CMD" },
    RegEntry { offset: 0xe8, name: "EVENT_TS_ADDR" },
    RegEntry { offset: 0xea, name: "EVENT_TS_CTRL" },
    RegEntry { offset: 0xeb, name: "EVENT_TS_DATA" },
];

const A7XX_PIPE: &[RegEntry] = &[
    RegEntry { offset: 0x81, name: "WFI_PEND_DECR" },
    RegEntry { offset: 0x82, name: "QUERY_PEND_DECR" },
    RegEntry { offset: 0x84, name: "WAIT_MEM_WRITES" },
    RegEntry { offset: 0x87, name: "WAIT_FOR_IDLE" },
    RegEntry { offset: 0xa0, name: "NRT_ADDR" },
    RegEntry { offset: 0xa2, name: "NRT_DATA" },
    RegEntry { offset: 0xe7, name: "EVENT_CMD" },
    RegEntry { offset: 0xe8, name: "EVENT_TS_ADDR" },
    RegEntry { offset: 0xea, name: "EVENT_TS_CTRL" },
    RegEntry { offset: 0xeb, name: "EVENT_TS_DATA" },
];
fn lookup(table: &[RegEntry], offset: u32) -> Option<&'static str> {
    table.iter().find(|e| e.offset == offset).map(|e| e.name)
}

pub fn ctrl_table(gen: Generation) -> &'static [RegEntry] {
    match gen {
        Generation::Gen5 => A5XX_CTRL,
        Generation::Gen6 => A6XX_CTRL,
        Generation::Gen7 => A7XX_CTRL,
    }
}

pub fn pipe_table(gen: Generation) -> &'static [RegEntry] {
    match gen {
        // a5xx pipe registers are undocumented
        Generation::Gen5 => &[],
        Generation::Gen6 => A6XX_PIPE,
        Generation::Gen7 => A7XX_PIPE,
    }
}

pub fn ctrl_reg_name(gen: Generation, offset: u32) -> Option<&'static str> {
    lookup(ctrl_table(gen), offset)
}

pub fn sqe_reg_name(offset: u32) -> Option<&'static str> {
    lookup(SQE_REGS, offset)
}

pub fn pipe_reg_name(gen: Generation, offset: u32) -> Option<&'static str> {
    lookup(pipe_table(gen), offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sizes() {
        assert_eq!(A5XX_CTRL.len(), 9);
        assert_eq!(A6XX_CTRL.len(), 59);
        assert_eq!(A7XX_CTRL.len(), 56);
        assert_eq!(SQE_REGS.len(), 10);
    }

    #[test]
    fn offsets_are_unique_and_twelve_bit() {
        for gen in [Generation::Gen5, Generation::Gen6, Generation::Gen7] {
            let t = ctrl_table(gen);
            for (i, e) in t.iter().enumerate() {
                assert!(e.offset < 0x1000);
                assert!(t[i + 1..].iter().all(|o| o.offset != e.offset), "{gen}: {:#x}", e.offset);
            }
        }
    }

    #[test]
    fn same_offset_different_family() {
        assert_eq!(ctrl_reg_name(Generation::Gen5, 0x010), Some("REG_WRITE_ADDR"));
        assert_eq!(ctrl_reg_name(Generation::Gen6, 0x010), Some("IB1_BASE"));
        assert_eq!(ctrl_reg_name(Generation::Gen6, 0x200), Some("THREAD_SYNC"));
        assert_eq!(ctrl_reg_name(Generation::Gen7, 0x23f), Some("THREAD_SYNC"));
        assert_eq!(ctrl_reg_name(Generation::Gen7, 0x200), None);
    }

    #[test]
    fn pipe_and_sqe() {
        assert_eq!(pipe_reg_name(Generation::Gen6, 0x80), Some("WAIT_FOR_IDLE"));
        assert_eq!(pipe_reg_name(Generation::Gen7, 0x87), Some("WAIT_FOR_IDLE"));
        assert_eq!(pipe_reg_name(Generation::Gen5, 0x80), None);
        assert_eq!(sqe_reg_name(0x05), Some("SP"));
        assert_eq!(sqe_reg_name(0x10), None);
    }
}
