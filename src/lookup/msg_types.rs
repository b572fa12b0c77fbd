//! Audit message type names and codes.

use phf::phf_map;

/// Message type name to numeric code.
static MSG_TYPES: phf::Map<&'static str, u32> = phf_map! {
    "USER" => 1005,
    "LOGIN" => 1006,
    "USER_AUTH" => 1100,
    "USER_ACCT" => 1101,
    "USER_MGMT" => 1102,
    "CRED_ACQ" => 1103,
    "CRED_DISP" => 1104,
    "USER_START" => 1105,
    "USER_END" => 1106,
    "USER_AVC" => 1107,
    "USER_CHAUTHTOK" => 1108,
    "USER_ERR" => 1109,
    "CRED_REFR" => 1110,
    "USYS_CONFIG" => 1111,
    "USER_LOGIN" => 1112,
    "USER_LOGOUT" => 1113,
    "ADD_USER" => 1114,
    "DEL_USER" => 1115,
    "ADD_GROUP" => 1116,
    "DEL_GROUP" => 1117,
    "DAC_CHECK" => 1118,
    "CHGRP_ID" => 1119,
    "TEST" => 1120,
    "TRUSTED_APP" => 1121,
    "USER_SELINUX_ERR" => 1122,
    "USER_CMD" => 1123,
    "USER_TTY" => 1124,
    "CHUSER_ID" => 1125,
    "GRP_AUTH" => 1126,
    "SYSTEM_BOOT" => 1127,
    "SYSTEM_SHUTDOWN" => 1128,
    "SYSTEM_RUNLEVEL" => 1129,
    "SERVICE_START" => 1130,
    "SERVICE_STOP" => 1131,
    "GRP_MGMT" => 1132,
    "GRP_CHAUTHTOK" => 1133,
    "DAEMON_START" => 1200,
    "DAEMON_END" => 1201,
    "DAEMON_ABORT" => 1202,
    "DAEMON_CONFIG" => 1203,
    "DAEMON_RECONFIG" => 1204,
    "DAEMON_ROTATE" => 1205,
    "DAEMON_RESUME" => 1206,
    "DAEMON_ACCEPT" => 1207,
    "DAEMON_CLOSE" => 1208,
    "SYSCALL" => 1300,
    "PATH" => 1302,
    "IPC" => 1303,
    "SOCKETCALL" => 1304,
    "CONFIG_CHANGE" => 1305,
    "SOCKADDR" => 1306,
    "CWD" => 1307,
    "EXECVE" => 1309,
    "IPC_SET_PERM" => 1311,
    "MQ_OPEN" => 1312,
    "MQ_SENDRECV" => 1313,
    "MQ_NOTIFY" => 1314,
    "MQ_GETSETATTR" => 1315,
    "KERNEL_OTHER" => 1316,
    "FD_PAIR" => 1317,
    "OBJ_PID" => 1318,
    "TTY" => 1319,
    "EOE" => 1320,
    "BPRM_FCAPS" => 1321,
    "CAPSET" => 1322,
    "MMAP" => 1323,
    "NETFILTER_PKT" => 1324,
    "NETFILTER_CFG" => 1325,
    "SECCOMP" => 1326,
    "PROCTITLE" => 1327,
    "AVC" => 1400,
    "SELINUX_ERR" => 1401,
    "AVC_PATH" => 1402,
    "MAC_POLICY_LOAD" => 1403,
    "MAC_STATUS" => 1404,
    "MAC_CONFIG_CHANGE" => 1405,
    "MAC_UNLBL_ALLOW" => 1406,
    "MAC_CIPSOV4_ADD" => 1407,
    "MAC_CIPSOV4_DEL" => 1408,
    "MAC_MAP_ADD" => 1409,
    "MAC_MAP_DEL" => 1410,
    "MAC_IPSEC_EVENT" => 1415,
    "ANOM_PROMISCUOUS" => 1700,
    "ANOM_ABEND" => 1701,
    "ANOM_LINK" => 1702,
    "INTEGRITY_DATA" => 1800,
    "INTEGRITY_METADATA" => 1801,
    "INTEGRITY_STATUS" => 1802,
    "INTEGRITY_HASH" => 1803,
    "INTEGRITY_PCR" => 1804,
    "INTEGRITY_RULE" => 1805,
    "KERNEL" => 2000,
    "ANOM_LOGIN_FAILURES" => 2100,
    "ANOM_LOGIN_TIME" => 2101,
    "ANOM_LOGIN_SESSIONS" => 2102,
    "ANOM_LOGIN_ACCT" => 2103,
    "ANOM_LOGIN_LOCATION" => 2104,
    "ANOM_MAX_DAC" => 2105,
    "ANOM_MAX_MAC" => 2106,
    "ANOM_AMTU_FAIL" => 2107,
    "ANOM_RBAC_FAIL" => 2108,
    "ANOM_RBAC_INTEGRITY_FAIL" => 2109,
    "ANOM_CRYPTO_FAIL" => 2110,
    "ANOM_ACCESS_FS" => 2111,
    "ANOM_EXEC" => 2112,
    "ANOM_MK_EXEC" => 2113,
    "ANOM_ADD_ACCT" => 2114,
    "ANOM_DEL_ACCT" => 2115,
    "ANOM_MOD_ACCT" => 2116,
    "ANOM_ROOT_TRANS" => 2117,
    "RESP_ANOMALY" => 2200,
    "RESP_ALERT" => 2201,
    "RESP_KILL_PROC" => 2202,
    "RESP_TERM_ACCESS" => 2203,
    "RESP_ACCT_REMOTE" => 2204,
    "RESP_ACCT_LOCK_TIMED" => 2205,
    "RESP_ACCT_UNLOCK_TIMED" => 2206,
    "RESP_ACCT_LOCK" => 2207,
    "RESP_TERM_LOCK" => 2208,
    "RESP_SEBOOL" => 2209,
    "RESP_EXEC" => 2210,
    "RESP_SINGLE" => 2211,
    "RESP_HALT" => 2212,
    "USER_ROLE_CHANGE" => 2300,
    "ROLE_ASSIGN" => 2301,
    "ROLE_REMOVE" => 2302,
    "LABEL_OVERRIDE" => 2303,
    "LABEL_LEVEL_CHANGE" => 2304,
    "USER_LABELED_EXPORT" => 2305,
    "USER_UNLABELED_EXPORT" => 2306,
    "DEV_ALLOC" => 2307,
    "DEV_DEALLOC" => 2308,
    "FS_RELABEL" => 2309,
    "USER_MAC_POLICY_LOAD" => 2310,
    "ROLE_MODIFY" => 2311,
    "USER_MAC_CONFIG_CHANGE" => 2312,
    "CRYPTO_TEST_USER" => 2400,
    "CRYPTO_PARAM_CHANGE_USER" => 2401,
    "CRYPTO_LOGIN" => 2402,
    "CRYPTO_LOGOUT" => 2403,
    "CRYPTO_KEY_USER" => 2404,
    "CRYPTO_FAILURE_USER" => 2405,
    "CRYPTO_REPLAY_USER" => 2406,
    "CRYPTO_SESSION" => 2407,
    "CRYPTO_IKE_SA" => 2408,
    "CRYPTO_IPSEC_SA" => 2409,
    "VIRT_CONTROL" => 2500,
    "VIRT_RESOURCE" => 2501,
    "VIRT_MACHINE_ID" => 2502,
};

/// Resolve a record type name (case-insensitive) to its numeric code.
///
/// Names of the form `UNKNOWN[1234]`, which the kernel emits for types it
/// has no name for, resolve to the embedded number.
pub fn msg_type_from_name(name: &str) -> Option<u32> {
    let upper = name.to_ascii_uppercase();
    if let Some(code) = MSG_TYPES.get(upper.as_str()) {
        return Some(*code);
    }
    upper
        .strip_prefix("UNKNOWN[")
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|num| num.parse().ok())
}

/// Resolve a numeric record type to its name.
pub fn msg_type_to_name(code: u32) -> Option<&'static str> {
    MSG_TYPES
        .entries()
        .find(|(_, &c)| c == code)
        .map(|(name, _)| *name)
}

/// Display form of a record type: its name, or `UNKNOWN[code]`.
pub fn msg_type_display(code: u32) -> String {
    match msg_type_to_name(code) {
        Some(name) => name.to_string(),
        None => format!("UNKNOWN[{code}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_lookup_is_case_insensitive() {
        assert_eq!(msg_type_from_name("syscall"), Some(1300));
        assert_eq!(msg_type_from_name("USER_LOGIN"), Some(1112));
    }

    #[test]
    fn test_unknown_bracket_form() {
        assert_eq!(msg_type_from_name("UNKNOWN[1334]"), Some(1334));
        assert_eq!(msg_type_from_name("UNKNOWN[abc]"), None);
        assert_eq!(msg_type_from_name("NOT_A_TYPE"), None);
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(msg_type_to_name(1400), Some("AVC"));
        assert_eq!(msg_type_display(9999), "UNKNOWN[9999]");
    }
}
