//! Server error code mnemonics.

/// `(code, mnemonic)` pairs sorted by code.
static ERROR_NAMES: &[(u16, &str)] = &[
    (1000, "ER_HASHCHK"),
    (1001, "ER_NISAMCHK"),
    (1002, "ER_NO"),
    (1003, "ER_YES"),
    (1004, "ER_CANT_CREATE_FILE"),
    (1005, "ER_CANT_CREATE_TABLE"),
    (1006, "ER_CANT_CREATE_DB"),
    (1007, "ER_DB_CREATE_EXISTS"),
    (1008, "ER_DB_DROP_EXISTS"),
    (1009, "ER_DB_DROP_DELETE"),
    (1010, "ER_DB_DROP_RMDIR"),
    (1011, "ER_CANT_DELETE_FILE"),
    (1012, "ER_CANT_FIND_SYSTEM_REC"),
    (1013, "ER_CANT_GET_STAT"),
    (1014, "ER_CANT_GET_WD"),
    (1015, "ER_CANT_LOCK"),
    (1016, "ER_CANT_OPEN_FILE"),
    (1017, "ER_FILE_NOT_FOUND"),
    (1018, "ER_CANT_READ_DIR"),
    (1019, "ER_CANT_SET_WD"),
    (1020, "ER_CHECKREAD"),
    (1021, "ER_DISK_FULL"),
    (1022, "ER_DUP_KEY"),
    (1023, "ER_ERROR_ON_CLOSE"),
    (1024, "ER_ERROR_ON_READ"),
    (1025, "ER_ERROR_ON_RENAME"),
    (1026, "ER_ERROR_ON_WRITE"),
    (1027, "ER_FILE_USED"),
    (1028, "ER_FILSORT_ABORT"),
    (1029, "ER_FORM_NOT_FOUND"),
    (1030, "ER_GET_ERRNO"),
    (1031, "ER_ILLEGAL_HA"),
    (1032, "ER_KEY_NOT_FOUND"),
    (1033, "ER_NOT_FORM_FILE"),
    (1034, "ER_NOT_KEYFILE"),
    (1035, "ER_OLD_KEYFILE"),
    (1036, "ER_OPEN_AS_READONLY"),
    (1037, "ER_OUTOFMEMORY"),
    (1038, "ER_OUT_OF_SORTMEMORY"),
    (1039, "ER_UNEXPECTED_EOF"),
    (1040, "ER_CON_COUNT_ERROR"),
    (1041, "ER_OUT_OF_RESOURCES"),
    (1042, "ER_BAD_HOST_ERROR"),
    (1043, "ER_HANDSHAKE_ERROR"),
    (1044, "ER_DBACCESS_DENIED_ERROR"),
    (1045, "ER_ACCESS_DENIED_ERROR"),
    (1046, "ER_NO_DB_ERROR"),
    (1047, "ER_UNKNOWN_COM_ERROR"),
    (1048, "ER_BAD_NULL_ERROR"),
    (1049, "ER_BAD_DB_ERROR"),
    (1050, "ER_TABLE_EXISTS_ERROR"),
    (1051, "ER_BAD_TABLE_ERROR"),
    (1052, "ER_NON_UNIQ_ERROR"),
    (1053, "ER_SERVER_SHUTDOWN"),
    (1054, "ER_BAD_FIELD_ERROR"),
    (1055, "ER_WRONG_FIELD_WITH_GROUP"),
    (1056, "ER_WRONG_GROUP_FIELD"),
    (1057, "ER_WRONG_SUM_SELECT"),
    (1058, "ER_WRONG_VALUE_COUNT"),
    (1059, "ER_TOO_LONG_IDENT"),
    (1060, "ER_DUP_FIELDNAME"),
    (1061, "ER_DUP_KEYNAME"),
    (1062, "ER_DUP_ENTRY"),
    (1063, "ER_WRONG_FIELD_SPEC"),
    (1064, "ER_PARSE_ERROR"),
    (1065, "ER_EMPTY_QUERY"),
    (1066, "ER_NONUNIQ_TABLE"),
    (1067, "ER_INVALID_DEFAULT"),
    (1068, "ER_MULTIPLE_PRI_KEY"),
    (1069, "ER_TOO_MANY_KEYS"),
    (1070, "ER_TOO_MANY_KEY_PARTS"),
    (1071, "ER_TOO_LONG_KEY"),
    (1072, "ER_KEY_COLUMN_DOES_NOT_EXITS"),
    (1073, "ER_BLOB_USED_AS_KEY"),
    (1074, "ER_TOO_BIG_FIELDLENGTH"),
    (1075, "ER_WRONG_AUTO_KEY"),
    (1076, "ER_READY"),
    (1077, "ER_NORMAL_SHUTDOWN"),
    (1078, "ER_GOT_SIGNAL"),
    (1079, "ER_SHUTDOWN_COMPLETE"),
    (1080, "ER_FORCING_CLOSE"),
    (1081, "ER_IPSOCK_ERROR"),
    (1082, "ER_NO_SUCH_INDEX"),
    (1083, "ER_WRONG_FIELD_TERMINATORS"),
    (1084, "ER_BLOBS_AND_NO_TERMINATED"),
    (1085, "ER_TEXTFILE_NOT_READABLE"),
    (1086, "ER_FILE_EXISTS_ERROR"),
    (1087, "ER_LOAD_INFO"),
    (1088, "ER_ALTER_INFO"),
    (1089, "ER_WRONG_SUB_KEY"),
    (1090, "ER_CANT_REMOVE_ALL_FIELDS"),
    (1091, "ER_CANT_DROP_FIELD_OR_KEY"),
    (1092, "ER_INSERT_INFO"),
    (1093, "ER_UPDATE_TABLE_USED"),
    (1094, "ER_NO_SUCH_THREAD"),
    (1095, "ER_KILL_DENIED_ERROR"),
    (1096, "ER_NO_TABLES_USED"),
    (1100, "ER_TABLE_NOT_LOCKED"),
    (1105, "ER_UNKNOWN_ERROR"),
    (1109, "ER_UNKNOWN_TABLE"),
    (1110, "ER_FIELD_SPECIFIED_TWICE"),
    (1111, "ER_INVALID_GROUP_FUNC_USE"),
    (1113, "ER_TABLE_MUST_HAVE_COLUMNS"),
    (1114, "ER_RECORD_FILE_FULL"),
    (1115, "ER_UNKNOWN_CHARACTER_SET"),
    (1116, "ER_TOO_MANY_TABLES"),
    (1117, "ER_TOO_MANY_FIELDS"),
    (1118, "ER_TOO_BIG_ROWSIZE"),
    (1119, "ER_STACK_OVERRUN"),
    (1120, "ER_WRONG_OUTER_JOIN"),
    (1121, "ER_NULL_COLUMN_IN_INDEX"),
    (1130, "ER_HOST_NOT_PRIVILEGED"),
    (1131, "ER_PASSWORD_ANONYMOUS_USER"),
    (1132, "ER_PASSWORD_NOT_ALLOWED"),
    (1133, "ER_PASSWORD_NO_MATCH"),
    (1136, "ER_WRONG_VALUE_COUNT_ON_ROW"),
    (1138, "ER_INVALID_USE_OF_NULL"),
    (1139, "ER_REGEXP_ERROR"),
    (1140, "ER_MIX_OF_GROUP_FUNC_AND_FIELDS"),
    (1141, "ER_NONEXISTING_GRANT"),
    (1142, "ER_TABLEACCESS_DENIED_ERROR"),
    (1143, "ER_COLUMNACCESS_DENIED_ERROR"),
    (1144, "ER_ILLEGAL_GRANT_FOR_TABLE"),
    (1145, "ER_GRANT_WRONG_HOST_OR_USER"),
    (1146, "ER_NO_SUCH_TABLE"),
    (1147, "ER_NONEXISTING_TABLE_GRANT"),
    (1148, "ER_NOT_ALLOWED_COMMAND"),
    (1149, "ER_SYNTAX_ERROR"),
    (1152, "ER_ABORTING_CONNECTION"),
    (1153, "ER_NET_PACKET_TOO_LARGE"),
    (1154, "ER_NET_READ_ERROR_FROM_PIPE"),
    (1155, "ER_NET_FCNTL_ERROR"),
    (1156, "ER_NET_PACKETS_OUT_OF_ORDER"),
    (1157, "ER_NET_UNCOMPRESS_ERROR"),
    (1158, "ER_NET_READ_ERROR"),
    (1159, "ER_NET_READ_INTERRUPTED"),
    (1160, "ER_NET_ERROR_ON_WRITE"),
    (1161, "ER_NET_WRITE_INTERRUPTED"),
    (1162, "ER_TOO_LONG_STRING"),
    (1166, "ER_WRONG_COLUMN_NAME"),
    (1167, "ER_WRONG_KEY_COLUMN"),
    (1169, "ER_DUP_UNIQUE"),
    (1170, "ER_BLOB_KEY_WITHOUT_LENGTH"),
    (1171, "ER_PRIMARY_CANT_HAVE_NULL"),
    (1172, "ER_TOO_MANY_ROWS"),
    (1173, "ER_REQUIRES_PRIMARY_KEY"),
    (1175, "ER_UPDATE_WITHOUT_KEY_IN_SAFE_MODE"),
    (1176, "ER_KEY_DOES_NOT_EXITS"),
    (1177, "ER_CHECK_NO_SUCH_TABLE"),
    (1178, "ER_CHECK_NOT_IMPLEMENTED"),
    (1179, "ER_CANT_DO_THIS_DURING_AN_TRANSACTION"),
    (1180, "ER_ERROR_DURING_COMMIT"),
    (1181, "ER_ERROR_DURING_ROLLBACK"),
    (1182, "ER_ERROR_DURING_FLUSH_LOGS"),
    (1184, "ER_NEW_ABORTING_CONNECTION"),
    (1203, "ER_TOO_MANY_USER_CONNECTIONS"),
    (1204, "ER_SET_CONSTANTS_ONLY"),
    (1205, "ER_LOCK_WAIT_TIMEOUT"),
    (1206, "ER_LOCK_TABLE_FULL"),
    (1207, "ER_READ_ONLY_TRANSACTION"),
    (1211, "ER_NO_PERMISSION_TO_CREATE_USER"),
    (1213, "ER_LOCK_DEADLOCK"),
    (1214, "ER_TABLE_CANT_HANDLE_FT"),
    (1215, "ER_CANNOT_ADD_FOREIGN"),
    (1216, "ER_NO_REFERENCED_ROW"),
    (1217, "ER_ROW_IS_REFERENCED"),
    (1218, "ER_CONNECT_TO_MASTER"),
    (1222, "ER_WRONG_NUMBER_OF_COLUMNS_IN_SELECT"),
    (1226, "ER_USER_LIMIT_REACHED"),
    (1227, "ER_SPECIFIC_ACCESS_DENIED_ERROR"),
    (1229, "ER_GLOBAL_VARIABLE"),
    (1231, "ER_WRONG_VALUE_FOR_VAR"),
    (1232, "ER_WRONG_TYPE_FOR_VAR"),
    (1235, "ER_NOT_SUPPORTED_YET"),
    (1242, "ER_SUBQUERY_NO_1_ROW"),
    (1243, "ER_UNKNOWN_STMT_HANDLER"),
    (1248, "ER_DERIVED_MUST_HAVE_ALIAS"),
    (1251, "ER_NOT_SUPPORTED_AUTH_MODE"),
    (1264, "ER_WARN_DATA_OUT_OF_RANGE"),
    (1265, "WARN_DATA_TRUNCATED"),
    (1267, "ER_CANT_AGGREGATE_2COLLATIONS"),
    (1290, "ER_OPTION_PREVENTS_STATEMENT"),
    (1292, "ER_TRUNCATED_WRONG_VALUE"),
    (1298, "ER_UNKNOWN_TIME_ZONE"),
    (1305, "ER_SP_DOES_NOT_EXIST"),
    (1317, "ER_QUERY_INTERRUPTED"),
    (1318, "ER_SP_WRONG_NO_OF_ARGS"),
    (1364, "ER_NO_DEFAULT_FOR_FIELD"),
    (1366, "ER_TRUNCATED_WRONG_VALUE_FOR_FIELD"),
    (1370, "ER_PROCACCESS_DENIED_ERROR"),
    (1406, "ER_DATA_TOO_LONG"),
    (1411, "ER_WRONG_VALUE_FOR_TYPE"),
    (1421, "ER_STMT_HAS_NO_OPEN_CURSOR"),
    (1451, "ER_ROW_IS_REFERENCED_2"),
    (1452, "ER_NO_REFERENCED_ROW_2"),
    (1461, "ER_MAX_PREPARED_STMT_COUNT_REACHED"),
    (1690, "ER_DATA_OUT_OF_RANGE"),
    (1698, "ER_ACCESS_DENIED_NO_PASSWORD_ERROR"),
    (1792, "ER_CANT_EXECUTE_IN_READ_ONLY_TRANSACTION"),
    (1820, "ER_MUST_CHANGE_PASSWORD"),
    (1862, "ER_MUST_CHANGE_PASSWORD_LOGIN"),
    (1927, "ER_CONNECTION_KILLED"),
    (3024, "ER_QUERY_TIMEOUT"),
    (3140, "ER_INVALID_JSON_TEXT"),
    (3819, "ER_CHECK_CONSTRAINT_VIOLATED"),
    (4031, "ER_CLIENT_INTERACTION_TIMEOUT"),
];

/// Mnemonic for a server error code, `None` if the code is not in the table.
pub fn error_name(code: u16) -> Option<&'static str> {
    ERROR_NAMES
        .binary_search_by_key(&code, |&(c, _)| c)
        .ok()
        .map(|i| ERROR_NAMES[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_unique() {
        assert!(ERROR_NAMES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(error_name(1000), Some("ER_HASHCHK"));
        assert_eq!(error_name(1045), Some("ER_ACCESS_DENIED_ERROR"));
        assert_eq!(error_name(1062), Some("ER_DUP_ENTRY"));
        assert_eq!(error_name(1213), Some("ER_LOCK_DEADLOCK"));
        assert_eq!(error_name(3819), Some("ER_CHECK_CONSTRAINT_VIOLATED"));
        assert_eq!(error_name(1097), None);
        assert_eq!(error_name(0), None);
        assert_eq!(error_name(u16::MAX), None);
    }
}
