//! ネットワークエラーコード表
//!
//! Chromium の net error 空間に倣った数値コードと説明文の対応表。
//! 未知のコードは `"Unknown error"` になる。
//!
//! ```rust
//! use socket_http11::net_error;
//!
//! assert_eq!(net_error::message(net_error::CONNECTION_REFUSED), "A connection attempt was refused.");
//! assert_eq!(net_error::message(12345), "Unknown error");
//! ```

pub const FAILED: i32 = -2;
pub const ABORTED: i32 = -3;
pub const TIMED_OUT: i32 = -7;
pub const FILE_TOO_BIG: i32 = -8;
pub const ACCESS_DENIED: i32 = -10;
pub const SOCKET_NOT_CONNECTED: i32 = -15;
pub const CONNECTION_CLOSED: i32 = -100;
pub const CONNECTION_RESET: i32 = -101;
pub const CONNECTION_REFUSED: i32 = -102;
pub const CONNECTION_ABORTED: i32 = -103;
pub const CONNECTION_FAILED: i32 = -104;
pub const NAME_NOT_RESOLVED: i32 = -105;
pub const INTERNET_DISCONNECTED: i32 = -106;
pub const SSL_PROTOCOL_ERROR: i32 = -107;
pub const ADDRESS_INVALID: i32 = -108;
pub const ADDRESS_UNREACHABLE: i32 = -109;
pub const TUNNEL_CONNECTION_FAILED: i32 = -111;
pub const BAD_SSL_CLIENT_AUTH_CERT: i32 = -117;
pub const CONNECTION_TIMED_OUT: i32 = -118;
pub const PROXY_CONNECTION_FAILED: i32 = -130;
pub const ADDRESS_IN_USE: i32 = -147;
pub const CERT_AUTHORITY_INVALID: i32 = -202;
pub const CERT_INVALID: i32 = -207;
pub const INVALID_URL: i32 = -300;
pub const UNKNOWN_URL_SCHEME: i32 = -302;
pub const TOO_MANY_REDIRECTS: i32 = -310;
pub const INVALID_RESPONSE: i32 = -320;
pub const INVALID_CHUNKED_ENCODING: i32 = -321;
pub const EMPTY_RESPONSE: i32 = -324;
pub const RESPONSE_HEADERS_TOO_BIG: i32 = -325;
pub const CONTENT_DECODING_FAILED: i32 = -330;
pub const INVALID_AUTH_CREDENTIALS: i32 = -338;
pub const UNSUPPORTED_AUTH_SCHEME: i32 = -339;

/// (コード, 名前, 説明) の表 (コードの降順)
static NET_ERRORS: &[(i32, &str, &str)] = &[
    (-1, "IO_PENDING", "An asynchronous IO operation is not yet complete."),
    (-2, "FAILED", "A generic failure occurred."),
    (-3, "ABORTED", "The operation was aborted."),
    (-4, "INVALID_ARGUMENT", "An argument to the function is incorrect."),
    (-5, "INVALID_HANDLE", "The handle or file descriptor is invalid."),
    (-6, "FILE_NOT_FOUND", "The file or directory cannot be found."),
    (-7, "TIMED_OUT", "An operation timed out."),
    (-8, "FILE_TOO_BIG", "The file is too large."),
    (-9, "UNEXPECTED", "An unexpected error occurred."),
    (-10, "ACCESS_DENIED", "Permission to access a resource, other than the network, was denied."),
    (-11, "NOT_IMPLEMENTED", "The operation failed because of unimplemented functionality."),
    (-12, "INSUFFICIENT_RESOURCES", "There were not enough resources to complete the operation."),
    (-13, "OUT_OF_MEMORY", "Memory allocation failed."),
    (-14, "UPLOAD_FILE_CHANGED", "The file upload failed because the file's modification time was different from the expectation."),
    (-15, "SOCKET_NOT_CONNECTED", "The socket is not connected."),
    (-16, "FILE_EXISTS", "The file already exists."),
    (-17, "FILE_PATH_TOO_LONG", "The path or file name is too long."),
    (-18, "FILE_NO_SPACE", "Not enough room left on the disk."),
    (-19, "FILE_VIRUS_INFECTED", "The file has a virus."),
    (-20, "BLOCKED_BY_CLIENT", "The client chose to block the request."),
    (-21, "NETWORK_CHANGED", "The network changed."),
    (-22, "BLOCKED_BY_ADMINISTRATOR", "The request was blocked by the URL block list configured by the domain administrator."),
    (-23, "SOCKET_IS_CONNECTED", "The socket is already connected."),
    (-24, "BLOCKED_ENROLLMENT_CHECK_PENDING", "The request was blocked because the forced reenrollment check is still pending."),
    (-25, "UPLOAD_STREAM_REWIND_NOT_SUPPORTED", "The upload failed because the upload stream needed to be re-read."),
    (-26, "CONTEXT_SHUT_DOWN", "The request failed because the request context is shutting down."),
    (-27, "BLOCKED_BY_RESPONSE", "The request failed because the response was delivered along with requirements which are not met."),
    (-29, "CLEARTEXT_NOT_PERMITTED", "The request was blocked by system policy disallowing some or all cleartext requests."),
    (-100, "CONNECTION_CLOSED", "A connection was closed (corresponding to a TCP FIN)."),
    (-101, "CONNECTION_RESET", "A connection was reset (corresponding to a TCP RST)."),
    (-102, "CONNECTION_REFUSED", "A connection attempt was refused."),
    (-103, "CONNECTION_ABORTED", "A connection timed out as a result of not receiving an ACK for data sent."),
    (-104, "CONNECTION_FAILED", "A connection attempt failed."),
    (-105, "NAME_NOT_RESOLVED", "The host name could not be resolved."),
    (-106, "INTERNET_DISCONNECTED", "The Internet connection has been lost."),
    (-107, "SSL_PROTOCOL_ERROR", "An SSL protocol error occurred."),
    (-108, "ADDRESS_INVALID", "The IP address or port number is invalid."),
    (-109, "ADDRESS_UNREACHABLE", "The IP address is unreachable."),
    (-110, "SSL_CLIENT_AUTH_CERT_NEEDED", "The server requested a client certificate for SSL client authentication."),
    (-111, "TUNNEL_CONNECTION_FAILED", "A tunnel connection through the proxy could not be established."),
    (-112, "NO_SSL_VERSIONS_ENABLED", "No SSL protocol versions are enabled."),
    (-113, "SSL_VERSION_OR_CIPHER_MISMATCH", "The client and server don't support a common SSL protocol version or cipher suite."),
    (-114, "SSL_RENEGOTIATION_REQUESTED", "The server requested a renegotiation (rehandshake)."),
    (-115, "PROXY_AUTH_UNSUPPORTED", "The proxy requested authentication (for tunnel establishment) with an unsupported method."),
    (-116, "CERT_ERROR_IN_SSL_RENEGOTIATION", "During SSL renegotiation, the server sent a certificate with an error."),
    (-117, "BAD_SSL_CLIENT_AUTH_CERT", "The SSL handshake failed because of a bad or missing client certificate."),
    (-118, "CONNECTION_TIMED_OUT", "A connection attempt timed out."),
    (-119, "HOST_RESOLVER_QUEUE_TOO_LARGE", "There are too many pending DNS resolves."),
    (-120, "SOCKS_CONNECTION_FAILED", "Failed establishing a connection to the SOCKS proxy server for a target host."),
    (-121, "SOCKS_CONNECTION_HOST_UNREACHABLE", "The SOCKS proxy server failed establishing connection to the target host because that host is unreachable."),
    (-122, "ALPN_NEGOTIATION_FAILED", "The request to negotiate an alternate protocol failed."),
    (-123, "SSL_NO_RENEGOTIATION", "The peer sent an SSL no_renegotiation alert message."),
    (-124, "WINSOCK_UNEXPECTED_WRITTEN_BYTES", "Winsock sometimes reports more data written than passed."),
    (-125, "SSL_DECOMPRESSION_FAILURE_ALERT", "An SSL peer sent us a fatal decompression_failure alert."),
    (-126, "SSL_BAD_RECORD_MAC_ALERT", "An SSL peer sent us a fatal bad_record_mac alert."),
    (-127, "PROXY_AUTH_REQUESTED", "The proxy requested authentication (for tunnel establishment)."),
    (-129, "SSL_WEAK_SERVER_EPHEMERAL_DH_KEY", "The SSL server attempted to use a weak ephemeral Diffie-Hellman key."),
    (-130, "PROXY_CONNECTION_FAILED", "Could not create a connection to the proxy server."),
    (-131, "MANDATORY_PROXY_CONFIGURATION_FAILED", "A mandatory proxy configuration could not be used."),
    (-133, "PRECONNECT_MAX_SOCKET_LIMIT", "The maximum number of sockets was reached while preconnecting."),
    (-134, "SSL_CLIENT_AUTH_PRIVATE_KEY_ACCESS_DENIED", "The permission to use the SSL client certificate's private key was denied."),
    (-135, "SSL_CLIENT_AUTH_CERT_NO_PRIVATE_KEY", "The SSL client certificate has no private key."),
    (-136, "PROXY_CERTIFICATE_INVALID", "The certificate presented by the HTTPS Proxy was invalid."),
    (-137, "NAME_RESOLUTION_FAILED", "An error occurred when trying to do a name resolution (DNS)."),
    (-138, "NETWORK_ACCESS_DENIED", "Permission to access the network was denied."),
    (-139, "TEMPORARILY_THROTTLED", "The request throttler module cancelled this request to avoid DDOS."),
    (-140, "HTTPS_PROXY_TUNNEL_RESPONSE_REDIRECT", "A request to create an SSL tunnel connection through the HTTPS proxy received a 302 response."),
    (-141, "SSL_CLIENT_AUTH_SIGNATURE_FAILED", "We were unable to sign the CertificateVerify data of an SSL client auth handshake."),
    (-142, "MSG_TOO_BIG", "The message was too large for the transport."),
    (-145, "WS_PROTOCOL_ERROR", "Websocket protocol error."),
    (-147, "ADDRESS_IN_USE", "Returned when attempting to bind an address that is already in use."),
    (-148, "SSL_HANDSHAKE_NOT_COMPLETED", "An operation failed because the SSL handshake has not completed."),
    (-149, "SSL_BAD_PEER_PUBLIC_KEY", "SSL peer's public key is invalid."),
    (-150, "SSL_PINNED_KEY_NOT_IN_CERT_CHAIN", "The certificate didn't match the built-in public key pins for the host name."),
    (-151, "CLIENT_AUTH_CERT_TYPE_UNSUPPORTED", "Server request for client certificate did not contain any types we support."),
    (-153, "SSL_DECRYPT_ERROR_ALERT", "An SSL peer sent us a fatal decrypt_error alert."),
    (-154, "WS_THROTTLE_QUEUE_TOO_LARGE", "There are too many pending WebSocketJob instances."),
    (-156, "SSL_SERVER_CERT_CHANGED", "The SSL server certificate changed in a renegotiation."),
    (-159, "SSL_UNRECOGNIZED_NAME_ALERT", "The SSL server sent us a fatal unrecognized_name alert."),
    (-160, "SOCKET_SET_RECEIVE_BUFFER_SIZE_ERROR", "Failed to set the socket's receive buffer size as requested."),
    (-161, "SOCKET_SET_SEND_BUFFER_SIZE_ERROR", "Failed to set the socket's send buffer size as requested."),
    (-162, "SOCKET_RECEIVE_BUFFER_SIZE_UNCHANGEABLE", "The socket's receive buffer size could not be set to the requested value."),
    (-163, "SOCKET_SEND_BUFFER_SIZE_UNCHANGEABLE", "The socket's send buffer size could not be set to the requested value."),
    (-164, "SSL_CLIENT_AUTH_CERT_BAD_FORMAT", "Failed to import a client certificate from the platform store into the SSL library."),
    (-166, "ICANN_NAME_COLLISION", "Resolving a hostname to an IP address list included the IPv4 address 127.0.53.53."),
    (-167, "SSL_SERVER_CERT_BAD_FORMAT", "The SSL server presented a certificate which could not be decoded."),
    (-168, "CT_STH_PARSING_FAILED", "Certificate Transparency: received a signed tree head that failed to parse."),
    (-169, "CT_STH_INCOMPATIBLE", "Certificate Transparency: received a signed tree head whose JSON parsing was OK but was missing some of the fields."),
    (-170, "CT_CONSISTENCY_PROOF_PARSING_FAILED", "Certificate Transparency: failed to parse the received consistency proof."),
    (-171, "SSL_OBSOLETE_CIPHER", "The SSL server required an unsupported cipher suite that has since been removed."),
    (-172, "WS_UPGRADE", "When a WebSocket handshake is done successfully and the connection has been upgraded."),
    (-173, "READ_IF_READY_NOT_IMPLEMENTED", "Socket ReadIfReady support is not implemented."),
    (-175, "NO_BUFFER_SPACE", "No socket buffer space is available."),
    (-176, "SSL_CLIENT_AUTH_NO_COMMON_ALGORITHMS", "There were no common signature algorithms between our client certificate private key and the server's preferences."),
    (-177, "EARLY_DATA_REJECTED", "TLS 1.3 early data was rejected by the server."),
    (-178, "WRONG_VERSION_ON_EARLY_DATA", "TLS 1.3 early data was offered, but the server responded with TLS 1.2 or earlier."),
    (-179, "TLS13_DOWNGRADE_DETECTED", "TLS 1.3 was enabled, but a lower version was negotiated and the server returned a value indicating it supported TLS 1.3."),
    (-180, "SSL_KEY_USAGE_INCOMPATIBLE", "The server's certificate has a keyUsage extension incompatible with the negotiated TLS key exchange method."),
    (-200, "CERT_COMMON_NAME_INVALID", "The server responded with a certificate whose common name did not match the host name."),
    (-201, "CERT_DATE_INVALID", "The server responded with a certificate that, by our clock, appears to either not yet be valid or to have expired."),
    (-202, "CERT_AUTHORITY_INVALID", "The server responded with a certificate that is signed by an authority we don't trust."),
    (-203, "CERT_CONTAINS_ERRORS", "The server responded with a certificate that contains errors."),
    (-204, "CERT_NO_REVOCATION_MECHANISM", "The certificate has no mechanism for determining if it is revoked."),
    (-205, "CERT_UNABLE_TO_CHECK_REVOCATION", "Revocation information for the security certificate for this site is not available."),
    (-206, "CERT_REVOKED", "The server responded with a certificate that has been revoked."),
    (-207, "CERT_INVALID", "The server responded with a certificate that is invalid."),
    (-208, "CERT_WEAK_SIGNATURE_ALGORITHM", "The server responded with a certificate that is signed using a weak signature algorithm."),
    (-210, "CERT_NON_UNIQUE_NAME", "The host name specified in the certificate is not unique."),
    (-211, "CERT_WEAK_KEY", "The server responded with a certificate that contains a weak key."),
    (-212, "CERT_NAME_CONSTRAINT_VIOLATION", "The certificate claimed DNS names that are in violation of name constraints."),
    (-213, "CERT_VALIDITY_TOO_LONG", "The certificate's validity period is too long."),
    (-214, "CERTIFICATE_TRANSPARENCY_REQUIRED", "Certificate Transparency was required for this connection, but the server did not provide CT information."),
    (-215, "CERT_SYMANTEC_LEGACY", "The certificate chained to a legacy Symantec root that is no longer trusted."),
    (-217, "CERT_KNOWN_INTERCEPTION_BLOCKED", "The certificate is known to be used for interception by an entity other than the device owner."),
    (-219, "CERT_END", "The value immediately past the last certificate error code."),
    (-300, "INVALID_URL", "The URL is invalid."),
    (-301, "DISALLOWED_URL_SCHEME", "The scheme of the URL is disallowed."),
    (-302, "UNKNOWN_URL_SCHEME", "The scheme of the URL is unknown."),
    (-303, "INVALID_REDIRECT", "Attempting to load an URL resulted in a redirect to an invalid URL."),
    (-310, "TOO_MANY_REDIRECTS", "Attempting to load an URL resulted in too many redirects."),
    (-311, "UNSAFE_REDIRECT", "Attempting to load an URL resulted in an unsafe redirect."),
    (-312, "UNSAFE_PORT", "Attempting to load an URL with an unsafe port number."),
    (-320, "INVALID_RESPONSE", "The server's response was invalid."),
    (-321, "INVALID_CHUNKED_ENCODING", "Error in chunked transfer encoding."),
    (-322, "METHOD_NOT_SUPPORTED", "The server did not support the request method."),
    (-323, "UNEXPECTED_PROXY_AUTH", "The response was 407 (Proxy Authentication Required), yet we did not send the request to a proxy."),
    (-324, "EMPTY_RESPONSE", "The server closed the connection without sending any data."),
    (-325, "RESPONSE_HEADERS_TOO_BIG", "The headers section of the response is too large."),
    (-327, "PAC_SCRIPT_FAILED", "The evaluation of the PAC script failed."),
    (-328, "REQUEST_RANGE_NOT_SATISFIABLE", "The response was 416 (Requested range not satisfiable) and the server cannot satisfy the range requested."),
    (-329, "MALFORMED_IDENTITY", "The identity used for authentication is invalid."),
    (-330, "CONTENT_DECODING_FAILED", "Content decoding of the response body failed."),
    (-331, "NETWORK_IO_SUSPENDED", "An operation could not be completed because all network IO is suspended."),
    (-332, "SYN_REPLY_NOT_RECEIVED", "FLIP data received without receiving a SYN_REPLY on the stream."),
    (-333, "ENCODING_CONVERSION_FAILED", "Converting the response to target encoding failed."),
    (-334, "UNRECOGNIZED_FTP_DIRECTORY_LISTING_FORMAT", "The server sent an FTP directory listing in a format we do not understand."),
    (-336, "NO_SUPPORTED_PROXIES", "There are no supported proxies in the provided list."),
    (-337, "HTTP2_PROTOCOL_ERROR", "There is an HTTP/2 protocol error."),
    (-338, "INVALID_AUTH_CREDENTIALS", "Credentials could not be established during HTTP Authentication."),
    (-339, "UNSUPPORTED_AUTH_SCHEME", "An HTTP Authentication scheme was tried which is not supported on this machine."),
    (-340, "ENCODING_DETECTION_FAILED", "Detecting the encoding of the response failed."),
    (-341, "MISSING_AUTH_CREDENTIALS", "The credentials required for authentication are missing."),
    (-342, "UNEXPECTED_SECURITY_LIBRARY_STATUS", "An unexpected, but documented, SSPI or GSSAPI status code was returned."),
    (-343, "MISCONFIGURED_AUTH_ENVIRONMENT", "The environment was not set up correctly for authentication."),
    (-344, "UNDOCUMENTED_SECURITY_LIBRARY_STATUS", "An undocumented SSPI or GSSAPI status code was returned."),
    (-345, "RESPONSE_BODY_TOO_BIG_TO_DRAIN", "The HTTP response was too big to drain."),
    (-346, "RESPONSE_HEADERS_MULTIPLE_CONTENT_LENGTH", "The HTTP response contained multiple distinct Content-Length headers."),
    (-347, "INCOMPLETE_HTTP2_HEADERS", "HTTP/2 headers have been received, but not all of them."),
    (-348, "PAC_NOT_IN_DHCP", "No PAC URL configuration could be retrieved from DHCP."),
    (-349, "RESPONSE_HEADERS_MULTIPLE_CONTENT_DISPOSITION", "The HTTP response contained multiple Content-Disposition headers."),
    (-350, "RESPONSE_HEADERS_MULTIPLE_LOCATION", "The HTTP response contained multiple Location headers."),
    (-351, "HTTP2_SERVER_REFUSED_STREAM", "HTTP/2 server refused the request without processing."),
    (-352, "HTTP2_PING_FAILED", "HTTP/2 server didn't respond to the PING message."),
    (-354, "CONTENT_LENGTH_MISMATCH", "The HTTP response body transferred fewer bytes than were advertised by the Content-Length header when the connection is closed."),
    (-355, "INCOMPLETE_CHUNKED_ENCODING", "The HTTP response body is transferred with Chunked-Encoding, but the terminating zero-length chunk was never sent when the connection is closed."),
    (-356, "QUIC_PROTOCOL_ERROR", "There is a QUIC protocol error."),
    (-357, "RESPONSE_HEADERS_TRUNCATED", "The HTTP headers were truncated by an EOF."),
    (-358, "QUIC_HANDSHAKE_FAILED", "The QUIC crypto handshake failed."),
    (-360, "HTTP2_INADEQUATE_TRANSPORT_SECURITY", "Transport security is inadequate for the HTTP/2 version."),
    (-361, "HTTP2_FLOW_CONTROL_ERROR", "The peer violated HTTP/2 flow control."),
    (-362, "HTTP2_FRAME_SIZE_ERROR", "The peer sent an improperly sized HTTP/2 frame."),
    (-363, "HTTP2_COMPRESSION_ERROR", "Decoding or encoding of compressed HTTP/2 headers failed."),
    (-364, "PROXY_AUTH_REQUESTED_WITH_NO_CONNECTION", "Proxy Auth Requested without a valid Client Socket Handle."),
    (-365, "HTTP_1_1_REQUIRED", "HTTP_1_1_REQUIRED error code received on HTTP/2 session."),
    (-366, "PROXY_HTTP_1_1_REQUIRED", "HTTP_1_1_REQUIRED error code received on HTTP/2 session to proxy."),
    (-367, "PAC_SCRIPT_TERMINATED", "The PAC script terminated fatally and must be reloaded."),
    (-370, "INVALID_HTTP_RESPONSE", "The server was expected to return an HTTP/1.x response, but did not."),
    (-371, "CONTENT_DECODING_INIT_FAILED", "Initializing content decoding failed."),
    (-372, "HTTP2_RST_STREAM_NO_ERROR_RECEIVED", "Received HTTP/2 RST_STREAM frame with NO_ERROR error code."),
    (-375, "TOO_MANY_RETRIES", "The request was retried too many times."),
    (-376, "HTTP2_STREAM_CLOSED", "Received an HTTP/2 frame on a closed stream."),
    (-379, "HTTP_RESPONSE_CODE_FAILURE", "The server returned a non-2xx HTTP response code."),
    (-380, "QUIC_CERT_ROOT_NOT_KNOWN", "The certificate presented on a QUIC connection does not chain to a known root."),
    (-381, "QUIC_GOAWAY_REQUEST_CAN_BE_RETRIED", "A GOAWAY frame has been received indicating that the request has not been processed."),
    (-400, "CACHE_MISS", "The cache does not have the requested entry."),
    (-401, "CACHE_READ_FAILURE", "Unable to read from the disk cache."),
    (-402, "CACHE_WRITE_FAILURE", "Unable to write to the disk cache."),
    (-403, "CACHE_OPERATION_NOT_SUPPORTED", "The operation is not supported for this entry."),
    (-404, "CACHE_OPEN_FAILURE", "The disk cache is unable to open this entry."),
    (-405, "CACHE_CREATE_FAILURE", "The disk cache is unable to create this entry."),
    (-406, "CACHE_RACE", "Multiple transactions are racing to create disk cache entries."),
    (-407, "CACHE_CHECKSUM_READ_FAILURE", "The cache was unable to read a checksum record on an entry."),
    (-408, "CACHE_CHECKSUM_MISMATCH", "The cache found an entry with an invalid checksum."),
    (-409, "CACHE_LOCK_TIMEOUT", "Internal error code for the HTTP cache."),
    (-410, "CACHE_AUTH_FAILURE_AFTER_READ", "Received a challenge after the transaction has read some data."),
    (-501, "INSECURE_RESPONSE", "The server's response was insecure (e.g. there was a cert error)."),
    (-502, "NO_PRIVATE_KEY_FOR_CERT", "An attempt to import a client certificate failed, as the user's key database lacked a corresponding private key."),
    (-503, "ADD_USER_CERT_FAILED", "An error adding a certificate to the OS certificate database."),
    (-504, "INVALID_SIGNED_EXCHANGE", "An error occurred while handling a signed exchange."),
    (-601, "FTP_FAILED", "A generic error for failed FTP control connection command."),
    (-602, "FTP_SERVICE_UNAVAILABLE", "The server cannot fulfill the request at this point."),
    (-603, "FTP_TRANSFER_ABORTED", "The server has aborted the transfer."),
    (-604, "FTP_FILE_BUSY", "The file is busy, or some other temporary error condition on opening the file."),
    (-605, "FTP_SYNTAX_ERROR", "Server rejected our command because of syntax errors."),
    (-606, "FTP_COMMAND_NOT_SUPPORTED", "Server does not support the command we issued."),
    (-607, "FTP_BAD_COMMAND_SEQUENCE", "Server rejected our command because we didn't issue the commands in right order."),
    (-701, "PKCS12_IMPORT_BAD_PASSWORD", "PKCS #12 import failed due to incorrect password."),
    (-702, "PKCS12_IMPORT_FAILED", "PKCS #12 import failed due to other error."),
    (-703, "IMPORT_CA_CERT_NOT_CA", "CA import failed - not a CA cert."),
    (-704, "IMPORT_CERT_ALREADY_EXISTS", "Import failed - certificate already exists in database."),
    (-705, "IMPORT_CA_CERT_FAILED", "CA import failed due to some other error."),
    (-706, "IMPORT_SERVER_CERT_FAILED", "Server certificate import failed due to some internal error."),
    (-707, "PKCS12_IMPORT_INVALID_MAC", "PKCS #12 import failed due to invalid MAC."),
    (-708, "PKCS12_IMPORT_INVALID_FILE", "PKCS #12 import failed due to invalid/corrupt file."),
    (-709, "PKCS12_IMPORT_UNSUPPORTED", "PKCS #12 import failed due to unsupported features."),
    (-710, "KEY_GENERATION_FAILED", "Key generation failed."),
    (-712, "PRIVATE_KEY_EXPORT_FAILED", "Failure to export private key."),
    (-713, "SELF_SIGNED_CERT_GENERATION_FAILED", "Self-signed certificate generation failed."),
    (-714, "CERT_DATABASE_CHANGED", "The certificate database changed in some way."),
    (-800, "DNS_MALFORMED_RESPONSE", "DNS resolver received a malformed response."),
    (-801, "DNS_SERVER_REQUIRES_TCP", "DNS server requires TCP."),
    (-802, "DNS_SERVER_FAILED", "DNS server failed."),
    (-803, "DNS_TIMED_OUT", "DNS transaction timed out."),
    (-804, "DNS_CACHE_MISS", "The entry was not found in cache, for cache-only lookups."),
    (-805, "DNS_SEARCH_EMPTY", "Suffix search list rules prevent resolution of the given host name."),
    (-806, "DNS_SORT_ERROR", "Failed to sort addresses according to RFC3484."),
];

/// 未知のコードに対する説明文
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// コードから説明文を引く
pub fn message(code: i32) -> &'static str {
    lookup(code).map(|(_, msg)| msg).unwrap_or(UNKNOWN_ERROR)
}

/// コードから名前を引く (`ERR_` 接頭辞なし)
pub fn name(code: i32) -> Option<&'static str> {
    lookup(code).map(|(name, _)| name)
}

fn lookup(code: i32) -> Option<(&'static str, &'static str)> {
    // 表はコードの降順に並んでいる
    NET_ERRORS
        .binary_search_by(|(c, _, _)| code.cmp(c))
        .ok()
        .map(|i| (NET_ERRORS[i].1, NET_ERRORS[i].2))
}

/// I/O エラーの種別をネットワークエラーコードに変換
pub fn from_io_kind(kind: std::io::ErrorKind) -> i32 {
    use std::io::ErrorKind;
    match kind {
        ErrorKind::ConnectionRefused => CONNECTION_REFUSED,
        ErrorKind::ConnectionReset => CONNECTION_RESET,
        ErrorKind::ConnectionAborted => CONNECTION_ABORTED,
        ErrorKind::NotConnected => SOCKET_NOT_CONNECTED,
        ErrorKind::AddrInUse => ADDRESS_IN_USE,
        ErrorKind::AddrNotAvailable => ADDRESS_INVALID,
        ErrorKind::BrokenPipe | ErrorKind::UnexpectedEof => CONNECTION_CLOSED,
        ErrorKind::TimedOut => CONNECTION_TIMED_OUT,
        ErrorKind::PermissionDenied => ACCESS_DENIED,
        ErrorKind::HostUnreachable | ErrorKind::NetworkUnreachable => ADDRESS_UNREACHABLE,
        ErrorKind::NetworkDown => INTERNET_DISCONNECTED,
        _ => FAILED,
    }
}
