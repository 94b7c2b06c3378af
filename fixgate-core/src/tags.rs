/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Well-known FIX tag numbers.

/// BeginString.
pub const BEGIN_STRING: u32 = 8;
/// BodyLength.
pub const BODY_LENGTH: u32 = 9;
/// CheckSum.
pub const CHECK_SUM: u32 = 10;
/// MsgType.
pub const MSG_TYPE: u32 = 35;
/// MsgSeqNum.
pub const MSG_SEQ_NUM: u32 = 34;
/// SenderCompID.
pub const SENDER_COMP_ID: u32 = 49;
/// TargetCompID.
pub const TARGET_COMP_ID: u32 = 56;
/// SendingTime.
pub const SENDING_TIME: u32 = 52;
/// PossDupFlag.
pub const POSS_DUP_FLAG: u32 = 43;
/// PossResend.
pub const POSS_RESEND: u32 = 97;
/// OrigSendingTime.
pub const ORIG_SENDING_TIME: u32 = 122;
/// SenderSubID.
pub const SENDER_SUB_ID: u32 = 50;
/// TargetSubID.
pub const TARGET_SUB_ID: u32 = 57;
/// OnBehalfOfCompID.
pub const ON_BEHALF_OF_COMP_ID: u32 = 115;
/// DeliverToCompID.
pub const DELIVER_TO_COMP_ID: u32 = 128;
/// ApplVerID.
pub const APPL_VER_ID: u32 = 1128;

/// BeginSeqNo.
pub const BEGIN_SEQ_NO: u32 = 7;
/// EndSeqNo.
pub const END_SEQ_NO: u32 = 16;
/// NewSeqNo.
pub const NEW_SEQ_NO: u32 = 36;
/// Text.
pub const TEXT: u32 = 58;
/// EncryptMethod.
pub const ENCRYPT_METHOD: u32 = 98;
/// HeartBtInt.
pub const HEART_BT_INT: u32 = 108;
/// TestReqID.
pub const TEST_REQ_ID: u32 = 112;
/// GapFillFlag.
pub const GAP_FILL_FLAG: u32 = 123;
/// ResetSeqNumFlag.
pub const RESET_SEQ_NUM_FLAG: u32 = 141;
/// DefaultApplVerID.
pub const DEFAULT_APPL_VER_ID: u32 = 1137;

/// ClOrdID.
pub const CL_ORD_ID: u32 = 11;
/// ExecID.
pub const EXEC_ID: u32 = 17;
/// LastPx.
pub const LAST_PX: u32 = 31;
/// LastQty.
pub const LAST_QTY: u32 = 32;
/// OrderID.
pub const ORDER_ID: u32 = 37;
/// OrdStatus.
pub const ORD_STATUS: u32 = 39;
/// Side.
pub const SIDE: u32 = 54;
/// Symbol.
pub const SYMBOL: u32 = 55;
/// ExecType.
pub const EXEC_TYPE: u32 = 150;

/// Returns true when `tag` belongs in the standard header.
///
/// BeginString, BodyLength and MsgType are handled separately by
/// [`crate::Message`] and are not listed here.
#[must_use]
pub const fn is_header(tag: u32) -> bool {
    matches!(
        tag,
        MSG_SEQ_NUM
            | SENDER_COMP_ID
            | TARGET_COMP_ID
            | SENDING_TIME
            | POSS_DUP_FLAG
            | POSS_RESEND
            | ORIG_SENDING_TIME
            | SENDER_SUB_ID
            | TARGET_SUB_ID
            | ON_BEHALF_OF_COMP_ID
            | DELIVER_TO_COMP_ID
            | APPL_VER_ID
    )
}
