// Linux input event key codes (linux/input-event-codes.h) used by the key maps

use crate::frame::KeyId;

pub const KEY_ESC: KeyId = KeyId(1);
pub const KEY_1: KeyId = KeyId(2);
pub const KEY_2: KeyId = KeyId(3);
pub const KEY_3: KeyId = KeyId(4);
pub const KEY_4: KeyId = KeyId(5);
pub const KEY_5: KeyId = KeyId(6);
pub const KEY_6: KeyId = KeyId(7);
pub const KEY_7: KeyId = KeyId(8);
pub const KEY_8: KeyId = KeyId(9);
pub const KEY_9: KeyId = KeyId(10);
pub const KEY_0: KeyId = KeyId(11);
pub const KEY_MINUS: KeyId = KeyId(12);
pub const KEY_EQUAL: KeyId = KeyId(13);
pub const KEY_BACKSPACE: KeyId = KeyId(14);
pub const KEY_TAB: KeyId = KeyId(15);
pub const KEY_Q: KeyId = KeyId(16);
pub const KEY_W: KeyId = KeyId(17);
pub const KEY_E: KeyId = KeyId(18);
pub const KEY_R: KeyId = KeyId(19);
pub const KEY_T: KeyId = KeyId(20);
pub const KEY_Y: KeyId = KeyId(21);
pub const KEY_U: KeyId = KeyId(22);
pub const KEY_I: KeyId = KeyId(23);
pub const KEY_O: KeyId = KeyId(24);
pub const KEY_P: KeyId = KeyId(25);
pub const KEY_LEFTBRACE: KeyId = KeyId(26);
pub const KEY_RIGHTBRACE: KeyId = KeyId(27);
pub const KEY_ENTER: KeyId = KeyId(28);
pub const KEY_LEFTCTRL: KeyId = KeyId(29);
pub const KEY_A: KeyId = KeyId(30);
pub const KEY_S: KeyId = KeyId(31);
pub const KEY_D: KeyId = KeyId(32);
pub const KEY_F: KeyId = KeyId(33);
pub const KEY_G: KeyId = KeyId(34);
pub const KEY_H: KeyId = KeyId(35);
pub const KEY_J: KeyId = KeyId(36);
pub const KEY_K: KeyId = KeyId(37);
pub const KEY_L: KeyId = KeyId(38);
pub const KEY_SEMICOLON: KeyId = KeyId(39);
pub const KEY_APOSTROPHE: KeyId = KeyId(40);
pub const KEY_GRAVE: KeyId = KeyId(41);
pub const KEY_LEFTSHIFT: KeyId = KeyId(42);
pub const KEY_BACKSLASH: KeyId = KeyId(43);
pub const KEY_Z: KeyId = KeyId(44);
pub const KEY_X: KeyId = KeyId(45);
pub const KEY_C: KeyId = KeyId(46);
pub const KEY_V: KeyId = KeyId(47);
pub const KEY_B: KeyId = KeyId(48);
pub const KEY_N: KeyId = KeyId(49);
pub const KEY_M: KeyId = KeyId(50);
pub const KEY_COMMA: KeyId = KeyId(51);
pub const KEY_DOT: KeyId = KeyId(52);
pub const KEY_SLASH: KeyId = KeyId(53);
pub const KEY_RIGHTSHIFT: KeyId = KeyId(54);
pub const KEY_LEFTALT: KeyId = KeyId(56);
pub const KEY_SPACE: KeyId = KeyId(57);
pub const KEY_CAPSLOCK: KeyId = KeyId(58);
pub const KEY_102ND: KeyId = KeyId(86);
pub const KEY_RIGHTCTRL: KeyId = KeyId(97);
pub const KEY_RIGHTALT: KeyId = KeyId(100);
